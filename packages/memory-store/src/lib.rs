//! In-memory key-value backend for keyform.
//!
//! `MemoryBackend` plays the part of a key-value server: partitioned string
//! keys, byte values, per-key expiry and prefix scans. Pools opened on the
//! same backend see the same data, so closing a pool and connecting again
//! behaves like reconnecting to a server.
//!
//! # Example
//!
//! ```rust,ignore
//! use keyform_memory_store::MemoryBackend;
//! use keyform_ll_store::{Connector, ConnectOptions};
//!
//! let backend = MemoryBackend::new();
//! let pool = backend
//!     .connector()
//!     .connect("memory://local", &ConnectOptions::default())
//!     .await?;
//! ```

mod backend;

pub use backend::{MemoryBackend, MemoryConnector, MemoryPool, ADDRESS_SCHEME};

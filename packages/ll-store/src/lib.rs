//! Low-level keyform store traits
//!
//! This is the narrow waist of the keyform stack: the boundary to whatever
//! key-value server actually holds the data. Everything at this level is pure
//! bytes under string keys, split into numbered partitions. No key schemes, no
//! record formats, no validation.
//!
//! Implement this layer for:
//! - Network clients of a remote key-value server
//! - Embedded or in-memory backends used for tests
//! - Proxies that forward requests without inspecting them
//!
//! # Example
//!
//! ```rust,ignore
//! use keyform_ll_store::{KvPool, LLError, SetOptions};
//! use bytes::Bytes;
//!
//! async fn touch(pool: &dyn KvPool) -> Result<bool, LLError> {
//!     pool.set(0, "user:1", Bytes::from_static(b"{}"), SetOptions::default())
//!         .await
//! }
//! ```

pub use bytes::Bytes;

mod error;
mod options;
mod traits;

pub use error::LLError;
pub use options::{ConnectOptions, SetOptions};
pub use traits::{Connector, KvPool, Partition, SharedPool};

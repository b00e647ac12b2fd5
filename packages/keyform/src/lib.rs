//! keyform: typed, declaratively keyed resources over a key-value store.
//!
//! Applications declare which record shapes they store, how each is keyed and
//! which database and prefix it lives under. keyform then handles validation,
//! encoding, key layout and enumeration, over any store that implements
//! [`KvPool`].
//!
//! The crates underneath, from the bottom up:
//!
//! - `keyform-ll-store`: the byte-level store boundary (`KvPool`, `Connector`)
//! - `keyform-core-store`: keys, shapes and the error taxonomy
//! - `keyform-serde-store`: codecs, typed records and filters
//! - `keyform-memory-store`: an in-memory store with expiry
//! - `keyform-resource`: declarations, sessions and record operations
//!
//! # Example
//!
//! ```rust
//! use keyform::{ConnectionConfig, Interface, MemoryBackend, Resource, SaveOptions, Shape};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
//! struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! impl Shape for User {}
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> keyform::Result<()> {
//!     let mut builder = Interface::builder();
//!     let users = builder.declare(Resource::<User>::keyed_by("id"))?;
//!     let interface = builder.build(
//!         ConnectionConfig::new("memory://local"),
//!         MemoryBackend::new().connector(),
//!     );
//!
//!     let mut session = interface.connect().await?;
//!     let bound = session.bind(&users);
//!     let bob = bound.create(serde_json::json!({"id": 1, "name": "Bob"})).await?;
//!     assert_eq!(bound.get(1u64).await?, bob);
//!
//!     bound.delete([&bob]).await?;
//!     assert!(bound.try_get(1u64).await?.is_none());
//!
//!     session.close().await;
//!     Ok(())
//! }
//! ```

pub use keyform_core_store::{describe, KeyCodec, ShapeDescription, StorageKey, SEPARATOR};
pub use keyform_ll_store::{Bytes, KvPool, LLError, SetOptions, SharedPool};
pub use keyform_memory_store::{MemoryBackend, MemoryConnector, MemoryPool};
pub use keyform_resource::*;
pub use keyform_serde_store::{key_value_string, RecordCodec};

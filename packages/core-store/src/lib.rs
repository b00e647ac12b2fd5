//! Core keyform: Semantic Store Layer
//!
//! This layer adds meaning to the raw keys and bytes of the LL layer:
//! - `StorageKey` / `KeyCodec`: namespaced keys that split back unambiguously
//! - `Shape`: the typed record trait, with struct introspection via serde
//! - `Error`: the error taxonomy shared by every higher layer
//!
//! # Example
//!
//! ```rust
//! use keyform_core_store::KeyCodec;
//!
//! let codec = KeyCodec::new();
//! let key = codec.compose("user", "42").unwrap();
//! assert_eq!(key.as_str(), "user:42");
//! assert_eq!(codec.decompose(key.as_str(), "user").unwrap(), "42");
//! ```

mod error;
mod key;
mod shape;

pub use error::{Error, Result};
pub use key::{KeyCodec, StorageKey, SEPARATOR};
pub use shape::{describe, Shape, ShapeDescription};

// Re-export LL types for convenience
pub use keyform_ll_store::{
    Bytes, ConnectOptions, Connector, KvPool, LLError, Partition, SetOptions, SharedPool,
};

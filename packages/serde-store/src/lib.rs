//! Serde Integration for keyform
//!
//! This layer turns typed records into stored bytes and back. It adds:
//! - `Codec` / `JsonCodec`: field trees <-> bytes
//! - `RecordCodec<T>`: typed, shape-checked encode/decode/validate
//! - `key_value_string`: the string form of a record's key field
//! - `Filter`: client-side exact-match predicates
//!
//! # Example
//!
//! ```rust
//! use keyform_serde_store::{RecordCodec, Shape};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! impl Shape for User {}
//!
//! let codec = RecordCodec::<User>::default();
//! let user = codec.validate(serde_json::json!({"id": 1, "name": "Bob"})).unwrap();
//! let bytes = codec.encode(&user).unwrap();
//! assert_eq!(codec.decode(&bytes).unwrap(), user);
//! ```

pub use bytes::Bytes;

mod codec;
mod filter;
mod record;

pub use codec::{Codec, JsonCodec};
pub use filter::Filter;
pub use record::{key_value_string, scalar_string, RecordCodec};

// Re-export core types for convenience
pub use keyform_core_store::{Error, Result, Shape};

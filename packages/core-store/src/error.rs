//! Error types for the Core layer.

use keyform_ll_store::LLError;
use thiserror::Error;

/// Errors at the Core layer and above.
///
/// These include semantic errors (bad declarations, records that do not fit
/// their shape, ambiguous keys) in addition to the transport errors from the
/// LL layer.
#[derive(Debug, Error)]
pub enum Error {
    /// A resource declaration is invalid. Raised while declaring, never later.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Fields or stored bytes do not conform to the resource's shape.
    #[error("validation error: {0}")]
    Validation(String),

    /// A key value cannot be turned into an unambiguous storage key.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// A storage key does not belong to the expected prefix.
    #[error("malformed key {key:?} for prefix {prefix:?}")]
    MalformedKey { key: String, prefix: String },

    /// A conditional write found the key already present.
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// No record is stored under the key.
    #[error("key not found: {0}")]
    NotFound(String),

    /// An argument is out of range, such as a zero TTL.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No live connection is available for the operation.
    #[error("connection error: {0}")]
    Connection(String),

    /// Error from the backing store.
    #[error("store error: {0}")]
    Store(#[from] LLError),
}

impl Error {
    /// Whether the error comes from a missing or broken connection.
    pub fn is_connection(&self) -> bool {
        match self {
            Error::Connection(_) => true,
            Error::Store(e) => e.is_disconnect(),
            _ => false,
        }
    }

    /// Whether the error is [`Error::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

/// Result type alias for keyform operations.
pub type Result<T> = std::result::Result<T, Error>;

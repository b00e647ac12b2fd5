//! Error types for the LL layer.
//!
//! Errors at this level are transport-focused. No semantic errors like
//! "record not found" or "invalid record" - those belong in higher layers.

use bytes::Bytes;

/// Errors at the LL (low-level) layer.
///
/// These are transport and system-level errors only. Semantic errors
/// (duplicate keys, malformed records, codec failures) belong in higher layers.
#[derive(Debug)]
pub enum LLError {
    /// Generic I/O or transport failure.
    ///
    /// Use this for network errors, refused connections, broken pipes, etc.
    Transport(Box<dyn std::error::Error + Send + Sync>),

    /// The connection or pool was closed before or while the request ran.
    Closed,

    /// The address given to a connector cannot be used by it.
    InvalidAddress(String),

    /// The operation is not supported by this store.
    NotSupported,

    /// The store answered with an error of its own, e.g. a server reply
    /// code, or a memory store whose lock was poisoned.
    Protocol { code: u32, detail: Bytes },
}

impl LLError {
    /// Whether the error means the connection is gone rather than that one
    /// request failed.
    pub fn is_disconnect(&self) -> bool {
        matches!(self, LLError::Closed | LLError::Transport(_))
    }
}

impl std::fmt::Display for LLError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLError::Transport(e) => write!(f, "transport error: {}", e),
            LLError::Closed => write!(f, "connection closed"),
            LLError::InvalidAddress(address) => write!(f, "invalid address: {}", address),
            LLError::NotSupported => write!(f, "operation not supported"),
            LLError::Protocol { code, detail } if detail.is_empty() => {
                write!(f, "protocol error {}", code)
            }
            LLError::Protocol { code, detail } => write!(
                f,
                "protocol error {}: {}",
                code,
                String::from_utf8_lossy(detail)
            ),
        }
    }
}

impl std::error::Error for LLError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        if let LLError::Transport(e) = self {
            Some(&**e)
        } else {
            None
        }
    }
}

/// `NotConnected` means the pool has already gone away; every other I/O
/// failure is a transport error.
impl From<std::io::Error> for LLError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::NotConnected => LLError::Closed,
            _ => LLError::Transport(Box::new(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_works() {
        let e = LLError::Closed;
        assert_eq!(format!("{}", e), "connection closed");

        let e = LLError::Protocol {
            code: 42,
            detail: Bytes::from_static(b"WRONGTYPE"),
        };
        assert_eq!(format!("{}", e), "protocol error 42: WRONGTYPE");

        let e = LLError::InvalidAddress("ftp://nowhere".to_string());
        assert!(format!("{}", e).contains("ftp://nowhere"));
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let ll_err: LLError = io_err.into();
        assert!(matches!(ll_err, LLError::Transport(_)));
        assert!(ll_err.is_disconnect());

        let gone = std::io::Error::from(std::io::ErrorKind::NotConnected);
        assert!(matches!(LLError::from(gone), LLError::Closed));
    }

    #[test]
    fn protocol_errors_are_not_disconnects() {
        let e = LLError::Protocol {
            code: 1,
            detail: Bytes::new(),
        };
        assert!(!e.is_disconnect());
        assert_eq!(format!("{}", e), "protocol error 1");
    }
}

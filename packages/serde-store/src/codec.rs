//! Byte codecs for stored values.

use bytes::Bytes;
use keyform_core_store::{Error, Result};
use serde_json::Value;

/// Codec for converting between field trees and stored bytes.
///
/// Codecs only deal in untyped `serde_json::Value` trees; typing and shape
/// checks happen in [`RecordCodec`](crate::RecordCodec). Decoding must need
/// nothing but the bytes themselves.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Arc<dyn Codec>`.
pub trait Codec: Send + Sync {
    /// Short name used in error messages.
    fn name(&self) -> &'static str;

    /// Encode a field tree into bytes.
    fn encode(&self, value: &Value) -> Result<Bytes>;

    /// Decode bytes into a field tree.
    fn decode(&self, bytes: &Bytes) -> Result<Value>;
}

/// A codec that stores records as UTF-8 JSON.
///
/// This is the default codec for every resource.
///
/// # Example
///
/// ```rust
/// use keyform_serde_store::{Codec, JsonCodec};
///
/// let codec = JsonCodec;
/// let value = serde_json::json!({"id": 1, "name": "Bob"});
///
/// let bytes = codec.encode(&value).unwrap();
/// assert_eq!(codec.decode(&bytes).unwrap(), value);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn name(&self) -> &'static str {
        "json"
    }

    fn encode(&self, value: &Value) -> Result<Bytes> {
        let bytes = serde_json::to_vec(value)
            .map_err(|e| Error::Validation(format!("json encode failed: {}", e)))?;
        Ok(Bytes::from(bytes))
    }

    fn decode(&self, bytes: &Bytes) -> Result<Value> {
        serde_json::from_slice(bytes)
            .map_err(|e| Error::Validation(format!("stored bytes are not valid json: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_codec_roundtrip() {
        let codec = JsonCodec;
        let original = serde_json::json!({
            "name": "Alice",
            "age": 30,
            "tags": ["a", "b"],
            "nested": {"ok": true, "ratio": 0.5}
        });

        let bytes = codec.encode(&original).unwrap();
        let decoded = codec.decode(&bytes).unwrap();

        assert_eq!(original, decoded);
    }

    #[test]
    fn json_codec_rejects_garbage() {
        let codec = JsonCodec;
        let result = codec.decode(&Bytes::from_static(b"\x00not json"));
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn json_codec_writes_plain_json() {
        let bytes = JsonCodec
            .encode(&serde_json::json!({"id": 1}))
            .unwrap();
        assert_eq!(&bytes[..], br#"{"id":1}"#);
    }
}

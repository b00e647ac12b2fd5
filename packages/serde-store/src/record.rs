//! Typed record encoding on top of a byte [`Codec`].

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use bytes::Bytes;
use keyform_core_store::{Error, Result, Shape};
use serde_json::{Map, Value};

use crate::{Codec, JsonCodec};

/// Encodes records of shape `T` to stored bytes and back.
///
/// Every record leaving or entering the store passes through
/// [`Shape::check`], so a record that fails validation is never written and
/// stored data that no longer fits the shape surfaces as
/// [`Error::Validation`].
pub struct RecordCodec<T> {
    codec: Arc<dyn Codec>,
    _shape: PhantomData<fn() -> T>,
}

impl<T> Clone for RecordCodec<T> {
    fn clone(&self) -> Self {
        Self {
            codec: self.codec.clone(),
            _shape: PhantomData,
        }
    }
}

impl<T> fmt::Debug for RecordCodec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordCodec")
            .field("codec", &self.codec.name())
            .finish()
    }
}

impl<T: Shape> Default for RecordCodec<T> {
    fn default() -> Self {
        Self::new(Arc::new(JsonCodec))
    }
}

impl<T: Shape> RecordCodec<T> {
    /// Create a record codec over the given byte codec.
    pub fn new(codec: Arc<dyn Codec>) -> Self {
        Self {
            codec,
            _shape: PhantomData,
        }
    }

    /// Name of the underlying byte codec.
    pub fn codec_name(&self) -> &'static str {
        self.codec.name()
    }

    /// Build a record from raw fields, enforcing the shape.
    pub fn validate(&self, raw: Value) -> Result<T> {
        let record: T = serde_json::from_value(raw)
            .map_err(|e| Error::Validation(format!("{}: {}", T::shape_name(), e)))?;
        self.check(&record)?;
        Ok(record)
    }

    /// Serialize a record for storage.
    pub fn encode(&self, record: &T) -> Result<Bytes> {
        self.check(record)?;
        let value = serde_json::to_value(record)
            .map_err(|e| Error::Validation(format!("{}: {}", T::shape_name(), e)))?;
        self.codec.encode(&value)
    }

    /// Deserialize stored bytes and validate them against the shape.
    pub fn decode(&self, bytes: &Bytes) -> Result<T> {
        let value = self.codec.decode(bytes)?;
        self.validate(value)
    }

    /// The record's serialized fields.
    ///
    /// Fails if the shape does not serialize to a map of fields.
    pub fn to_fields(&self, record: &T) -> Result<Map<String, Value>> {
        match serde_json::to_value(record) {
            Ok(Value::Object(fields)) => Ok(fields),
            Ok(other) => Err(Error::Validation(format!(
                "{} serializes to {}, not a map of fields",
                T::shape_name(),
                kind(&other)
            ))),
            Err(e) => Err(Error::Validation(format!("{}: {}", T::shape_name(), e))),
        }
    }

    fn check(&self, record: &T) -> Result<()> {
        record
            .check()
            .map_err(|message| Error::Validation(format!("{}: {}", T::shape_name(), message)))
    }
}

/// String form of a key field's value.
///
/// Strings are used as-is; numbers and booleans use their JSON rendering.
/// Missing, null and compound values cannot key a record.
pub fn key_value_string(fields: &Map<String, Value>, key_field: &str) -> Result<String> {
    match fields.get(key_field) {
        Some(value) => scalar_string(value).ok_or_else(|| {
            Error::Validation(format!(
                "key field {:?} holds {}, expected a string, number or boolean",
                key_field,
                kind(value)
            ))
        }),
        None => Err(Error::Validation(format!(
            "key field {:?} is missing",
            key_field
        ))),
    }
}

/// String form of a scalar value, or `None` for null and compound values.
pub fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a map",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct User {
        id: u64,
        name: String,
        email: Option<String>,
        tags: Vec<String>,
    }

    impl Shape for User {
        fn check(&self) -> std::result::Result<(), String> {
            if self.name.trim().is_empty() {
                return Err("name must not be blank".to_string());
            }
            Ok(())
        }
    }

    fn bob() -> User {
        User {
            id: 1,
            name: "Bob".to_string(),
            email: None,
            tags: vec!["admin".to_string()],
        }
    }

    #[test]
    fn encode_decode_preserves_fields() {
        let codec = RecordCodec::<User>::default();
        let original = bob();

        let bytes = codec.encode(&original).unwrap();
        let decoded = codec.decode(&bytes).unwrap();

        assert_eq!(original, decoded);
    }

    #[test]
    fn validate_builds_from_raw_fields() {
        let codec = RecordCodec::<User>::default();
        let user = codec
            .validate(json!({"id": 7, "name": "Ann", "email": "ann@example.com", "tags": []}))
            .unwrap();
        assert_eq!(user.id, 7);
        assert_eq!(user.email.as_deref(), Some("ann@example.com"));
    }

    #[test]
    fn validate_rejects_wrong_types_and_missing_fields() {
        let codec = RecordCodec::<User>::default();
        let err = codec
            .validate(json!({"id": "seven", "name": "Ann", "tags": []}))
            .unwrap_err();
        assert!(matches!(err, Error::Validation(ref m) if m.starts_with("User")));

        assert!(matches!(
            codec.validate(json!({"id": 1, "tags": []})),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn check_hook_applies_both_ways() {
        let codec = RecordCodec::<User>::default();
        let mut blank = bob();
        blank.name = "  ".to_string();
        assert!(matches!(codec.encode(&blank), Err(Error::Validation(_))));

        let stored = Bytes::from_static(br#"{"id":2,"name":"","email":null,"tags":[]}"#);
        assert!(matches!(codec.decode(&stored), Err(Error::Validation(_))));
    }

    #[test]
    fn decode_surfaces_shape_drift() {
        let codec = RecordCodec::<User>::default();
        let old_layout = Bytes::from_static(br#"{"id":3,"full_name":"Old"}"#);
        assert!(matches!(codec.decode(&old_layout), Err(Error::Validation(_))));
    }

    #[test]
    fn key_values_from_fields() {
        let codec = RecordCodec::<User>::default();
        let fields = codec.to_fields(&bob()).unwrap();
        assert_eq!(key_value_string(&fields, "id").unwrap(), "1");
        assert_eq!(key_value_string(&fields, "name").unwrap(), "Bob");
        assert!(matches!(
            key_value_string(&fields, "email"),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            key_value_string(&fields, "tags"),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            key_value_string(&fields, "nope"),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn scalar_strings() {
        assert_eq!(scalar_string(&json!(true)).as_deref(), Some("true"));
        assert_eq!(scalar_string(&json!(-4)).as_deref(), Some("-4"));
        assert_eq!(scalar_string(&json!("x")).as_deref(), Some("x"));
        assert_eq!(scalar_string(&json!(null)), None);
    }
}

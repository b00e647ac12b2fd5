//! Exact-match record filters.
//!
//! The backing store cannot evaluate predicates, so filters run client-side
//! against each record's serialized fields.

use keyform_core_store::{Error, Result, Shape};
use serde_json::{Map, Value};

/// A conjunction of `field == value` terms.
///
/// An empty filter matches every record.
///
/// # Example
///
/// ```rust
/// use keyform_serde_store::Filter;
///
/// let filter = Filter::new().equals("name", "Bob").equals("active", true);
/// let fields = serde_json::json!({"id": 1, "name": "Bob", "active": true});
/// assert!(filter.matches(fields.as_object().unwrap()));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Filter {
    terms: Vec<(String, Value)>,
}

impl Filter {
    /// A filter matching everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field` to equal `value`.
    #[must_use]
    pub fn equals(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.terms.push((field.into(), value.into()));
        self
    }

    /// The terms of the filter, in insertion order.
    pub fn terms(&self) -> &[(String, Value)] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Reject terms naming fields that `T` does not declare.
    ///
    /// Shapes without an introspectable field list accept any name.
    pub fn check_fields<T: Shape>(&self) -> Result<()> {
        let Some(known) = T::field_names() else {
            return Ok(());
        };

        let unknown: Vec<&str> = self
            .terms
            .iter()
            .map(|(field, _)| field.as_str())
            .filter(|field| !known.iter().any(|k| k == field))
            .collect();

        if unknown.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(format!(
                "invalid filter fields for {}: {:?}",
                T::shape_name(),
                unknown
            )))
        }
    }

    /// Whether every term matches the given fields.
    ///
    /// Numbers compare by value, so `1` matches a stored `1.0`.
    pub fn matches(&self, fields: &Map<String, Value>) -> bool {
        self.terms.iter().all(|(field, expected)| {
            fields
                .get(field)
                .is_some_and(|actual| same_value(actual, expected))
        })
    }
}

fn same_value(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) if a.is_f64() || b.is_f64() => {
            a.as_f64() == b.as_f64()
        }
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| same_value(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, x)| b.get(key).is_some_and(|y| same_value(x, y)))
        }
        _ => actual == expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Serialize, Deserialize)]
    struct User {
        id: u64,
        name: String,
        nickname: Option<String>,
    }

    impl Shape for User {}

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = Filter::new();
        assert!(filter.is_empty());
        assert!(filter.matches(&fields(json!({"id": 1}))));
    }

    #[test]
    fn all_terms_must_match() {
        let filter = Filter::new().equals("name", "Bob").equals("id", 1);
        assert!(filter.matches(&fields(json!({"id": 1, "name": "Bob"}))));
        assert!(!filter.matches(&fields(json!({"id": 2, "name": "Bob"}))));
        assert!(!filter.matches(&fields(json!({"id": 1, "name": "bob"}))));
    }

    #[test]
    fn numbers_compare_by_value() {
        let filter = Filter::new().equals("score", 1);
        assert!(filter.matches(&fields(json!({"score": 1.0}))));
        assert!(filter.matches(&fields(json!({"score": 1}))));
        assert!(!filter.matches(&fields(json!({"score": 1.5}))));
        assert!(!filter.matches(&fields(json!({"score": "1"}))));

        let filter = Filter::new().equals("score", 2.0);
        assert!(filter.matches(&fields(json!({"score": 2}))));

        let filter = Filter::new().equals("tags", json!([1, {"w": 2}]));
        assert!(filter.matches(&fields(json!({"tags": [1.0, {"w": 2.0}]}))));
        assert!(!filter.matches(&fields(json!({"tags": [1.0]}))));
    }

    #[test]
    fn missing_fields_do_not_match() {
        let filter = Filter::new().equals("name", "Bob");
        assert!(!filter.matches(&fields(json!({"id": 1}))));
    }

    #[test]
    fn null_matches_none() {
        let filter = Filter::new().equals("nickname", Value::Null);
        assert!(filter.matches(&fields(json!({"nickname": null}))));
        assert!(!filter.matches(&fields(json!({"nickname": "B"}))));
    }

    #[test]
    fn check_fields_rejects_unknown_names() {
        assert!(Filter::new().equals("name", "Bob").check_fields::<User>().is_ok());

        let err = Filter::new()
            .equals("name", "Bob")
            .equals("age", 3)
            .check_fields::<User>()
            .unwrap_err();
        match err {
            Error::Validation(message) => {
                assert!(message.contains("User"));
                assert!(message.contains("age"));
                assert!(!message.contains("name"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

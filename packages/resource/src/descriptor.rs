//! Resource declarations.
//!
//! A [`Resource`] is the builder an application fills in; declaring it on an
//! [`InterfaceBuilder`](crate::InterfaceBuilder) validates it and freezes it
//! into a [`ResourceDescriptor`], which never changes afterwards.

use std::fmt;
use std::sync::Arc;

use keyform_core_store::{Error, KeyCodec, Partition, Result, Shape, StorageKey};
use keyform_serde_store::{key_value_string, Codec, JsonCodec, RecordCodec};

/// How a record's key value is derived.
pub enum KeySource<T> {
    /// The value of a named field.
    Field(String),
    /// A function of the whole record.
    Func(Arc<dyn Fn(&T) -> String + Send + Sync>),
}

impl<T> Clone for KeySource<T> {
    fn clone(&self) -> Self {
        match self {
            KeySource::Field(name) => KeySource::Field(name.clone()),
            KeySource::Func(f) => KeySource::Func(f.clone()),
        }
    }
}

impl<T> fmt::Debug for KeySource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySource::Field(name) => f.debug_tuple("Field").field(name).finish(),
            KeySource::Func(_) => f.write_str("Func(..)"),
        }
    }
}

/// Declaration of a resource of shape `T`.
///
/// # Example
///
/// ```rust
/// use keyform_resource::Resource;
/// use keyform_serde_store::Shape;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct User {
///     id: u64,
///     name: String,
/// }
///
/// impl Shape for User {}
///
/// // Stored as `user:<id>` in database 0.
/// let users = Resource::<User>::keyed_by("id");
///
/// // Stored as `app_user:<id>` in database 2.
/// let users = Resource::<User>::keyed_by("id").db(2).prefix("app_user");
/// ```
pub struct Resource<T> {
    key: KeySource<T>,
    partition: Partition,
    prefix: Option<String>,
    codec: Arc<dyn Codec>,
    keys: KeyCodec,
}

impl<T: Shape> Resource<T> {
    /// Key records by the value of `field`.
    pub fn keyed_by(field: impl Into<String>) -> Self {
        Self::with_key(KeySource::Field(field.into()))
    }

    /// Key records by an arbitrary function of the record.
    pub fn keyed_by_fn(key: impl Fn(&T) -> String + Send + Sync + 'static) -> Self {
        Self::with_key(KeySource::Func(Arc::new(key)))
    }

    fn with_key(key: KeySource<T>) -> Self {
        Self {
            key,
            partition: 0,
            prefix: None,
            codec: Arc::new(JsonCodec),
            keys: KeyCodec::new(),
        }
    }

    /// Store the resource in partition `partition`. Defaults to 0.
    #[must_use]
    pub fn partition(mut self, partition: Partition) -> Self {
        self.partition = partition;
        self
    }

    /// Alias of [`partition`](Resource::partition), named after the numbered
    /// databases of common key-value servers.
    #[must_use]
    pub fn db(self, db: Partition) -> Self {
        self.partition(db)
    }

    /// Namespace the resource's keys with `prefix` instead of the lower-cased
    /// shape name.
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Store records with `codec` instead of JSON.
    #[must_use]
    pub fn codec(mut self, codec: impl Codec + 'static) -> Self {
        self.codec = Arc::new(codec);
        self
    }

    /// Split keys with a custom key codec.
    #[must_use]
    pub fn key_codec(mut self, keys: KeyCodec) -> Self {
        self.keys = keys;
        self
    }

    /// Validate the declaration and freeze it.
    pub(crate) fn into_descriptor(self) -> Result<ResourceDescriptor<T>> {
        let prefix = self
            .prefix
            .unwrap_or_else(|| T::shape_name().to_lowercase());
        self.keys.validate_prefix(&prefix)?;

        let key_name = match &self.key {
            KeySource::Field(field) => {
                let fields = T::field_names().ok_or_else(|| {
                    Error::Configuration(format!(
                        "cannot list the fields of {}; key it with a function or override Shape::field_names",
                        T::shape_name()
                    ))
                })?;
                if !fields.iter().any(|known| *known == field.as_str()) {
                    return Err(Error::Configuration(format!(
                        "key field {:?} is not a field of {} (fields: {:?})",
                        field,
                        T::shape_name(),
                        fields
                    )));
                }
                field.clone()
            }
            KeySource::Func(_) => "<fn>".to_string(),
        };

        Ok(ResourceDescriptor {
            info: ResourceInfo {
                shape: T::shape_name(),
                key: key_name,
                partition: self.partition,
                prefix,
                codec: self.codec.name(),
            },
            key: self.key,
            keys: self.keys,
            records: RecordCodec::new(self.codec),
        })
    }
}

/// What a declared resource looks like, without its type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceInfo {
    /// Shape name.
    pub shape: &'static str,
    /// Key field name, or `<fn>` for function keys.
    pub key: String,
    pub partition: Partition,
    pub prefix: String,
    /// Name of the byte codec.
    pub codec: &'static str,
}

impl ResourceInfo {
    /// Whether two resources would write to the same keys.
    pub fn collides_with(&self, other: &ResourceInfo) -> bool {
        self.partition == other.partition && self.prefix == other.prefix
    }
}

impl fmt::Display for ResourceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}(key={}, db={}, prefix={})",
            self.shape, self.key, self.partition, self.prefix
        )
    }
}

/// A validated, immutable resource declaration.
pub struct ResourceDescriptor<T> {
    info: ResourceInfo,
    key: KeySource<T>,
    keys: KeyCodec,
    records: RecordCodec<T>,
}

impl<T: Shape> ResourceDescriptor<T> {
    pub fn info(&self) -> &ResourceInfo {
        &self.info
    }

    pub fn key_source(&self) -> &KeySource<T> {
        &self.key
    }

    pub fn key_codec(&self) -> &KeyCodec {
        &self.keys
    }

    pub fn record_codec(&self) -> &RecordCodec<T> {
        &self.records
    }

    /// The key value of `record`, as a string.
    pub fn key_value(&self, record: &T) -> Result<String> {
        match &self.key {
            KeySource::Field(field) => {
                let fields = self.records.to_fields(record)?;
                key_value_string(&fields, field)
            }
            KeySource::Func(f) => Ok(f(record)),
        }
    }

    /// The storage key for a key value.
    pub fn storage_key(&self, key_value: &str) -> Result<StorageKey> {
        self.keys.compose(&self.info.prefix, key_value)
    }

    /// The storage key of `record`.
    pub fn record_key(&self, record: &T) -> Result<StorageKey> {
        self.storage_key(&self.key_value(record)?)
    }

    /// The key value encoded in a raw key found by a scan.
    pub fn key_value_of(&self, raw_key: &str) -> Result<String> {
        self.keys.decompose(raw_key, &self.info.prefix)
    }

    /// The string scans for this resource's keys start with.
    pub fn scan_prefix(&self) -> String {
        self.keys.scan_prefix(&self.info.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::collections::BTreeMap;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct User {
        id: u64,
        name: String,
    }

    impl Shape for User {}

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Session {
        user: String,
        device: String,
    }

    impl Shape for Session {}

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(transparent)]
    struct Settings(BTreeMap<String, String>);

    impl Shape for Settings {}

    fn bob() -> User {
        User {
            id: 1,
            name: "Bob".to_string(),
        }
    }

    #[test]
    fn defaults() {
        let descriptor = Resource::<User>::keyed_by("id").into_descriptor().unwrap();
        let info = descriptor.info();
        assert_eq!(info.shape, "User");
        assert_eq!(info.key, "id");
        assert_eq!(info.partition, 0);
        assert_eq!(info.prefix, "user");
        assert_eq!(info.codec, "json");
        assert_eq!(info.to_string(), "User(key=id, db=0, prefix=user)");
    }

    #[test]
    fn overrides() {
        let descriptor = Resource::<User>::keyed_by("name")
            .db(3)
            .prefix("people")
            .into_descriptor()
            .unwrap();
        assert_eq!(descriptor.info().partition, 3);
        assert_eq!(descriptor.info().prefix, "people");
        assert_eq!(descriptor.record_key(&bob()).unwrap().as_str(), "people:Bob");
    }

    #[test]
    fn record_keys_from_fields() {
        let descriptor = Resource::<User>::keyed_by("id").into_descriptor().unwrap();
        assert_eq!(descriptor.key_value(&bob()).unwrap(), "1");
        assert_eq!(descriptor.record_key(&bob()).unwrap().as_str(), "user:1");
        assert_eq!(descriptor.key_value_of("user:1").unwrap(), "1");
        assert_eq!(descriptor.scan_prefix(), "user:");
    }

    #[test]
    fn record_keys_from_functions() {
        let descriptor = Resource::<Session>::keyed_by_fn(|s| format!("{}.{}", s.user, s.device))
            .into_descriptor()
            .unwrap();
        let session = Session {
            user: "bob".to_string(),
            device: "phone".to_string(),
        };
        assert_eq!(descriptor.info().key, "<fn>");
        assert_eq!(
            descriptor.record_key(&session).unwrap().as_str(),
            "session:bob.phone"
        );
    }

    #[test]
    fn separator_in_key_value_is_rejected() {
        let descriptor = Resource::<User>::keyed_by("name").into_descriptor().unwrap();
        let user = User {
            id: 2,
            name: "a:b".to_string(),
        };
        assert!(matches!(
            descriptor.record_key(&user),
            Err(Error::Encoding(_))
        ));
    }

    #[test]
    fn unknown_key_field_is_a_configuration_error() {
        let result = Resource::<User>::keyed_by("uuid").into_descriptor();
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn bad_prefix_is_a_configuration_error() {
        for prefix in ["", "app:user"] {
            let result = Resource::<User>::keyed_by("id").prefix(prefix).into_descriptor();
            assert!(matches!(result, Err(Error::Configuration(_))));
        }
    }

    #[test]
    fn opaque_shapes_need_a_key_function() {
        let result = Resource::<Settings>::keyed_by("id").into_descriptor();
        assert!(matches!(result, Err(Error::Configuration(_))));

        let descriptor = Resource::<Settings>::keyed_by_fn(|s| s.0.len().to_string())
            .prefix("settings")
            .into_descriptor()
            .unwrap();
        assert_eq!(descriptor.info().prefix, "settings");
    }

    #[test]
    fn custom_key_separators() {
        let keys = KeyCodec::with_separator("/").unwrap();
        let descriptor = Resource::<User>::keyed_by("name")
            .key_codec(keys)
            .into_descriptor()
            .unwrap();
        let user = User {
            id: 2,
            name: "a:b".to_string(),
        };
        assert_eq!(descriptor.record_key(&user).unwrap().as_str(), "user/a:b");
        assert_eq!(descriptor.scan_prefix(), "user/");

        assert!(matches!(
            KeyCodec::with_separator(""),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn collisions() {
        let a = Resource::<User>::keyed_by("id").into_descriptor().unwrap();
        let b = Resource::<User>::keyed_by("name").into_descriptor().unwrap();
        let c = Resource::<User>::keyed_by("id").db(1).into_descriptor().unwrap();
        assert!(a.info().collides_with(b.info()));
        assert!(!a.info().collides_with(c.info()));
    }
}

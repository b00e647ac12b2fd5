//! Storage keys: `prefix` + separator + key value.

use std::fmt;

use crate::{Error, Result};

/// Separator between a resource prefix and a key value.
pub const SEPARATOR: &str = ":";

/// A composed storage key.
///
/// Only [`KeyCodec::compose`] builds these, so every `StorageKey` splits back
/// into exactly one `(prefix, key value)` pair.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct StorageKey(String);

impl StorageKey {
    /// The key as sent to the store.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Builds and splits storage keys.
///
/// Neither the prefix nor the key value may contain the separator. Prefixes
/// are checked once when a resource is declared; key values on every
/// [`compose`](KeyCodec::compose).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyCodec {
    separator: &'static str,
}

impl Default for KeyCodec {
    fn default() -> Self {
        Self {
            separator: SEPARATOR,
        }
    }
}

impl KeyCodec {
    /// A codec using [`SEPARATOR`].
    pub fn new() -> Self {
        Self::default()
    }

    /// A codec with a custom separator, which must not be empty.
    pub fn with_separator(separator: &'static str) -> Result<Self> {
        if separator.is_empty() {
            return Err(Error::Configuration(
                "key separator must not be empty".to_string(),
            ));
        }
        Ok(Self { separator })
    }

    /// The separator in use.
    pub fn separator(&self) -> &'static str {
        self.separator
    }

    /// Check that `prefix` can namespace a resource.
    pub fn validate_prefix(&self, prefix: &str) -> Result<()> {
        if prefix.is_empty() {
            return Err(Error::Configuration("resource prefix is empty".to_string()));
        }
        if prefix.contains(self.separator) {
            return Err(Error::Configuration(format!(
                "resource prefix {:?} contains the key separator {:?}",
                prefix, self.separator
            )));
        }
        Ok(())
    }

    /// Compose the storage key for `key_value` under `prefix`.
    ///
    /// Fails with [`Error::Encoding`] if the value is empty or contains the
    /// separator, since either would make the key impossible to split back.
    pub fn compose(&self, prefix: &str, key_value: &str) -> Result<StorageKey> {
        if key_value.is_empty() {
            return Err(Error::Encoding(format!(
                "empty key value for prefix {:?}",
                prefix
            )));
        }
        if key_value.contains(self.separator) {
            return Err(Error::Encoding(format!(
                "key value {:?} contains the key separator {:?}",
                key_value, self.separator
            )));
        }
        Ok(StorageKey(format!("{}{}{}", prefix, self.separator, key_value)))
    }

    /// Recover the key value from a raw storage key read back from the store.
    pub fn decompose(&self, key: &str, prefix: &str) -> Result<String> {
        let malformed = || Error::MalformedKey {
            key: key.to_string(),
            prefix: prefix.to_string(),
        };

        let rest = key.strip_prefix(prefix).ok_or_else(malformed)?;
        let value = rest.strip_prefix(self.separator).ok_or_else(malformed)?;
        if value.is_empty() || value.contains(self.separator) {
            return Err(malformed());
        }
        Ok(value.to_string())
    }

    /// The string to scan for when listing a resource's keys.
    ///
    /// Includes the separator so that `user` does not pick up `users:*`.
    pub fn scan_prefix(&self, prefix: &str) -> String {
        format!("{}{}", prefix, self.separator)
    }
}

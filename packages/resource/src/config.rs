//! Connection-time configuration.

use keyform_core_store::{ConnectOptions, Error, Result};
use serde::{Deserialize, Serialize};

/// Where an [`Interface`](crate::Interface) connects to, and how.
///
/// Loadable from JSON:
///
/// ```rust
/// use keyform_resource::ConnectionConfig;
///
/// let config = ConnectionConfig::from_json(
///     r#"{"address": "memory://local", "options": {"pool_max": 4}}"#,
/// )
/// .unwrap();
/// assert_eq!(config.options.pool_max, 4);
/// assert_eq!(config.options.pool_min, 1);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub address: String,
    #[serde(default)]
    pub options: ConnectOptions,
}

impl ConnectionConfig {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            options: ConnectOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: ConnectOptions) -> Self {
        self.options = options;
        self
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)
            .map_err(|e| Error::Configuration(format!("invalid connection config: {}", e)))?;
        if config.address.is_empty() {
            return Err(Error::Configuration(
                "connection address must not be empty".to_string(),
            ));
        }
        Ok(config)
    }
}

//! Per-request and per-connection options.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Options for a single `set` request.
///
/// The default is an unconditional write with no expiry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SetOptions {
    /// Remaining lifetime of the entry. `None` keeps it until deleted.
    pub ttl: Option<Duration>,
    /// Only write if no entry exists under the key.
    pub only_if_absent: bool,
}

impl SetOptions {
    /// Set the entry's lifetime as part of the write.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Make the write conditional on the key being absent.
    pub fn only_if_absent(mut self) -> Self {
        self.only_if_absent = true;
        self
    }
}

fn default_pool_min() -> usize {
    1
}

fn default_pool_max() -> usize {
    10
}

/// Options handed to a [`Connector`](crate::Connector) along with the address.
///
/// Only the pool bounds are understood by every connector; anything else a
/// particular backend needs travels in `extra`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectOptions {
    /// Connections opened eagerly.
    #[serde(default = "default_pool_min")]
    pub pool_min: usize,
    /// Upper bound on concurrently open connections.
    #[serde(default = "default_pool_max")]
    pub pool_max: usize,
    /// Backend-specific settings.
    #[serde(default)]
    pub extra: BTreeMap<String, String>,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            pool_min: default_pool_min(),
            pool_max: default_pool_max(),
            extra: BTreeMap::new(),
        }
    }
}

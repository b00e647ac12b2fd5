//! The shared in-memory data and the pools that access it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use keyform_ll_store::{
    ConnectOptions, Connector, KvPool, LLError, Partition, SetOptions, SharedPool,
};
use tokio::time::Instant;

/// Address scheme accepted by [`MemoryConnector`].
pub const ADDRESS_SCHEME: &str = "memory://";

struct Entry {
    value: Bytes,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

#[derive(Default)]
struct Shared {
    partitions: Mutex<HashMap<Partition, HashMap<String, Entry>>>,
    opened: AtomicUsize,
    open: AtomicUsize,
}

impl Shared {
    fn lock(&self) -> Result<MutexGuard<'_, HashMap<Partition, HashMap<String, Entry>>>, LLError> {
        self.partitions.lock().map_err(|_| LLError::Protocol {
            code: 100,
            detail: Bytes::from_static(b"lock poisoned"),
        })
    }
}

/// The data behind every pool opened from it.
///
/// Cloning is cheap and yields a handle to the same data.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    shared: Arc<Shared>,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a pool directly, without going through a connector.
    pub fn pool(&self) -> MemoryPool {
        self.shared.opened.fetch_add(1, Ordering::SeqCst);
        self.shared.open.fetch_add(1, Ordering::SeqCst);
        MemoryPool {
            shared: self.shared.clone(),
            closed: AtomicBool::new(false),
        }
    }

    /// A connector that opens pools on this backend.
    pub fn connector(&self) -> MemoryConnector {
        MemoryConnector {
            backend: self.clone(),
        }
    }

    /// Pools opened so far.
    pub fn connections_opened(&self) -> usize {
        self.shared.opened.load(Ordering::SeqCst)
    }

    /// Pools opened and not yet closed.
    pub fn open_connections(&self) -> usize {
        self.shared.open.load(Ordering::SeqCst)
    }
}

/// A pool on a [`MemoryBackend`].
///
/// After [`close`](KvPool::close) every request fails with [`LLError::Closed`].
pub struct MemoryPool {
    shared: Arc<Shared>,
    closed: AtomicBool,
}

impl MemoryPool {
    fn ensure_open(&self) -> Result<(), LLError> {
        if self.closed.load(Ordering::SeqCst) {
            Err(LLError::Closed)
        } else {
            Ok(())
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Drop for MemoryPool {
    fn drop(&mut self) {
        self.close();
    }
}

#[async_trait]
impl KvPool for MemoryPool {
    async fn get(&self, partition: Partition, key: &str) -> Result<Option<Bytes>, LLError> {
        self.ensure_open()?;
        let now = Instant::now();
        let mut partitions = self.shared.lock()?;
        let Some(entries) = partitions.get_mut(&partition) else {
            return Ok(None);
        };

        let live = entries
            .get(key)
            .map(|entry| entry.is_live(now).then(|| entry.value.clone()));
        match live {
            Some(Some(value)) => Ok(Some(value)),
            Some(None) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(
        &self,
        partition: Partition,
        key: &str,
        value: Bytes,
        options: SetOptions,
    ) -> Result<bool, LLError> {
        self.ensure_open()?;
        let now = Instant::now();
        let mut partitions = self.shared.lock()?;
        let entries = partitions.entry(partition).or_default();

        if options.only_if_absent && entries.get(key).is_some_and(|e| e.is_live(now)) {
            return Ok(false);
        }

        entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: options.ttl.map(|ttl| now + ttl),
            },
        );
        Ok(true)
    }

    async fn delete(&self, partition: Partition, key: &str) -> Result<bool, LLError> {
        self.ensure_open()?;
        let now = Instant::now();
        let mut partitions = self.shared.lock()?;
        let removed = partitions
            .get_mut(&partition)
            .and_then(|entries| entries.remove(key));
        Ok(removed.is_some_and(|e| e.is_live(now)))
    }

    async fn expire(
        &self,
        partition: Partition,
        key: &str,
        ttl: Duration,
    ) -> Result<bool, LLError> {
        self.ensure_open()?;
        let now = Instant::now();
        let mut partitions = self.shared.lock()?;
        let Some(entries) = partitions.get_mut(&partition) else {
            return Ok(false);
        };

        let live = entries.get(key).map(|entry| entry.is_live(now));
        match live {
            Some(true) if ttl.is_zero() => {
                entries.remove(key);
                Ok(true)
            }
            Some(true) => {
                if let Some(entry) = entries.get_mut(key) {
                    entry.expires_at = Some(now + ttl);
                }
                Ok(true)
            }
            Some(false) => {
                entries.remove(key);
                Ok(false)
            }
            None => Ok(false),
        }
    }

    async fn scan_keys(&self, partition: Partition, prefix: &str) -> Result<Vec<String>, LLError> {
        self.ensure_open()?;
        let now = Instant::now();
        let mut partitions = self.shared.lock()?;
        let Some(entries) = partitions.get_mut(&partition) else {
            return Ok(Vec::new());
        };

        entries.retain(|_, entry| entry.is_live(now));
        let keys: Vec<String> = entries
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();
        log::debug!(
            "scanned {} keys for {:?} in partition {}",
            keys.len(),
            prefix,
            partition
        );
        Ok(keys)
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.shared.open.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

/// Opens [`MemoryPool`]s for `memory://` addresses.
#[derive(Clone)]
pub struct MemoryConnector {
    backend: MemoryBackend,
}

impl MemoryConnector {
    /// The backend pools are opened on.
    pub fn backend(&self) -> &MemoryBackend {
        &self.backend
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(
        &self,
        address: &str,
        options: &ConnectOptions,
    ) -> Result<SharedPool, LLError> {
        if !address.starts_with(ADDRESS_SCHEME) {
            return Err(LLError::InvalidAddress(address.to_string()));
        }
        if options.pool_max == 0 || options.pool_min > options.pool_max {
            return Err(LLError::InvalidAddress(format!(
                "{} (pool bounds {}..={})",
                address, options.pool_min, options.pool_max
            )));
        }

        log::debug!("Opening memory pool for {}...", address);
        Ok(Arc::new(self.backend.pool()))
    }
}

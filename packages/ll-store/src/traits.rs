//! Core traits for the LL layer.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::{ConnectOptions, LLError, SetOptions};

/// A numbered logical database within one store.
pub type Partition = u32;

/// A pool handle shared between the owner and in-flight requests.
pub type SharedPool = Arc<dyn KvPool>;

/// A pooled connection to a key-value store.
///
/// This is the lowest-level data interface. Keys are strings, values are
/// bytes, and every request names the partition it targets. No parsing, no
/// validation.
///
/// Requests take `&self`: a pool multiplexes concurrent requests itself.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Arc<dyn KvPool>`.
#[async_trait]
pub trait KvPool: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Returns
    ///
    /// * `Ok(None)` - The key does not exist (not an error condition).
    /// * `Ok(Some(bytes))` - The stored value.
    /// * `Err(LLError)` - A transport or system error occurred.
    async fn get(&self, partition: Partition, key: &str) -> Result<Option<Bytes>, LLError>;

    /// Write `value` under `key`.
    ///
    /// Returns `false` only when `options.only_if_absent` was set and the key
    /// already existed; nothing is written in that case.
    async fn set(
        &self,
        partition: Partition,
        key: &str,
        value: Bytes,
        options: SetOptions,
    ) -> Result<bool, LLError>;

    /// Check whether `key` exists.
    async fn exists(&self, partition: Partition, key: &str) -> Result<bool, LLError> {
        Ok(self.get(partition, key).await?.is_some())
    }

    /// Remove `key`. Returns whether anything was removed.
    async fn delete(&self, partition: Partition, key: &str) -> Result<bool, LLError>;

    /// Set the remaining lifetime of `key`. Returns `false` if it does not exist.
    async fn expire(&self, partition: Partition, key: &str, ttl: Duration)
        -> Result<bool, LLError>;

    /// List every key in the partition starting with `prefix`, in no
    /// particular order.
    async fn scan_keys(&self, partition: Partition, prefix: &str) -> Result<Vec<String>, LLError>;

    /// Start closing the pool. Requests issued afterwards fail with
    /// [`LLError::Closed`].
    fn close(&self);

    /// Wait until every connection of the pool is released.
    async fn wait_closed(&self) {}
}

/// Opens pools. This is how an application plugs in its store client.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Open a pool to the store at `address`.
    async fn connect(&self, address: &str, options: &ConnectOptions)
        -> Result<SharedPool, LLError>;
}

#[async_trait]
impl<T: KvPool + ?Sized> KvPool for Arc<T> {
    async fn get(&self, partition: Partition, key: &str) -> Result<Option<Bytes>, LLError> {
        self.as_ref().get(partition, key).await
    }

    async fn set(
        &self,
        partition: Partition,
        key: &str,
        value: Bytes,
        options: SetOptions,
    ) -> Result<bool, LLError> {
        self.as_ref().set(partition, key, value, options).await
    }

    async fn exists(&self, partition: Partition, key: &str) -> Result<bool, LLError> {
        self.as_ref().exists(partition, key).await
    }

    async fn delete(&self, partition: Partition, key: &str) -> Result<bool, LLError> {
        self.as_ref().delete(partition, key).await
    }

    async fn expire(
        &self,
        partition: Partition,
        key: &str,
        ttl: Duration,
    ) -> Result<bool, LLError> {
        self.as_ref().expire(partition, key, ttl).await
    }

    async fn scan_keys(&self, partition: Partition, prefix: &str) -> Result<Vec<String>, LLError> {
        self.as_ref().scan_keys(partition, prefix).await
    }

    fn close(&self) {
        self.as_ref().close()
    }

    async fn wait_closed(&self) {
        self.as_ref().wait_closed().await
    }
}

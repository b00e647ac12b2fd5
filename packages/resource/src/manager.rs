//! Per-resource operations.
//!
//! A [`ResourceManager`] is created once per declared resource and holds no
//! connection. Operations run on a [`Bound`] view, which pairs the manager
//! with a [`Session`] and asks the session for its pool on every call.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use keyform_core_store::{
    Error, KvPool, Result, SetOptions, Shape, SharedPool, StorageKey,
};
use keyform_serde_store::{scalar_string, Filter, RecordCodec};
use serde::Serialize;
use serde_json::Value;

use crate::cursor::Cursor;
use crate::descriptor::{ResourceDescriptor, ResourceInfo};
use crate::interface::{InterfaceId, Session};

/// Identifies one record: either by key value or by the record itself.
///
/// Raw key values are rendered exactly like key fields read from a record,
/// so `2.0` reaches the record whose key field holds `2.0`.
pub enum Lookup<'a, T> {
    /// A raw key value.
    Key(Value),
    /// A record whose key is derived like on save.
    Record(&'a T),
}

impl<'a, T> Lookup<'a, T> {
    /// Look up by any scalar key value.
    ///
    /// Values that do not serialize to a string, number or boolean fail
    /// the lookup with [`Error::Validation`].
    pub fn key(value: impl Serialize) -> Self {
        Lookup::Key(serde_json::to_value(value).unwrap_or(Value::Null))
    }

    /// Look up by an existing record.
    pub fn record(record: &'a T) -> Self {
        Lookup::Record(record)
    }
}

impl<'a, T> From<&'a T> for Lookup<'a, T> {
    fn from(record: &'a T) -> Self {
        Lookup::Record(record)
    }
}

macro_rules! lookup_from_scalar {
    ($($ty:ty),*) => {
        $(
            impl<T> From<$ty> for Lookup<'_, T> {
                fn from(value: $ty) -> Self {
                    Lookup::Key(Value::from(value))
                }
            }
        )*
    };
}

lookup_from_scalar!(String, i32, i64, u32, u64, usize, f64, bool);

/// Options for [`Bound::save`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SaveOptions {
    /// Overwrite existing records. When false, saving over an existing key
    /// fails with [`Error::DuplicateKey`].
    pub allow_update: bool,
    /// Lifetime of the saved records. `None` keeps them until deleted.
    pub expire: Option<Duration>,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            allow_update: true,
            expire: None,
        }
    }
}

impl SaveOptions {
    /// Fail instead of overwriting existing records.
    #[must_use]
    pub fn no_update(mut self) -> Self {
        self.allow_update = false;
        self
    }

    /// Expire the saved records after `ttl`.
    #[must_use]
    pub fn expire(mut self, ttl: Duration) -> Self {
        self.expire = Some(ttl);
        self
    }
}

/// The runtime side of a declared resource.
///
/// Cheap to clone; clones share the same descriptor.
pub struct ResourceManager<T> {
    descriptor: Arc<ResourceDescriptor<T>>,
    interface: InterfaceId,
}

impl<T> Clone for ResourceManager<T> {
    fn clone(&self) -> Self {
        Self {
            descriptor: self.descriptor.clone(),
            interface: self.interface,
        }
    }
}

impl<T: Shape> fmt::Debug for ResourceManager<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceManager")
            .field("resource", self.descriptor.info())
            .finish()
    }
}

impl<T: Shape> ResourceManager<T> {
    pub(crate) fn new(descriptor: ResourceDescriptor<T>, interface: InterfaceId) -> Self {
        Self {
            descriptor: Arc::new(descriptor),
            interface,
        }
    }

    pub fn info(&self) -> &ResourceInfo {
        self.descriptor.info()
    }

    pub fn descriptor(&self) -> &ResourceDescriptor<T> {
        &self.descriptor
    }

    pub fn record_codec(&self) -> &RecordCodec<T> {
        self.descriptor.record_codec()
    }

    pub(crate) fn interface(&self) -> InterfaceId {
        self.interface
    }

    /// The storage key a lookup resolves to.
    pub fn key_of<'a>(&self, lookup: impl Into<Lookup<'a, T>>) -> Result<StorageKey> {
        match lookup.into() {
            Lookup::Key(value) => {
                let key_value = scalar_string(&value).ok_or_else(|| {
                    Error::Validation(format!(
                        "{} cannot be used as a key value for {}",
                        value,
                        self.descriptor.info()
                    ))
                })?;
                self.descriptor.storage_key(&key_value)
            }
            Lookup::Record(record) => self.descriptor.record_key(record),
        }
    }
}

/// A resource manager bound to a live session.
pub struct Bound<'s, T> {
    manager: &'s ResourceManager<T>,
    session: &'s Session,
}

impl<T> Clone for Bound<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Bound<'_, T> {}

impl<'s, T: Shape> Bound<'s, T> {
    pub(crate) fn new(manager: &'s ResourceManager<T>, session: &'s Session) -> Self {
        Self { manager, session }
    }

    pub fn manager(&self) -> &'s ResourceManager<T> {
        self.manager
    }

    fn descriptor(&self) -> &'s ResourceDescriptor<T> {
        &self.manager.descriptor
    }

    fn pool(&self) -> Result<&'s SharedPool> {
        self.session.resolve(self.manager.interface())
    }

    /// Build a record from raw fields and save it, refusing to overwrite.
    ///
    /// ```rust,ignore
    /// let user = session
    ///     .bind(&users)
    ///     .create(json!({"id": 1, "name": "Bob"}))
    ///     .await?;
    /// ```
    pub async fn create(&self, fields: Value) -> Result<T> {
        let record = self.descriptor().record_codec().validate(fields)?;
        self.save(std::slice::from_ref(&record), SaveOptions::default().no_update())
            .await?;
        Ok(record)
    }

    /// Store records.
    ///
    /// Keys and encodings for the whole batch are computed before anything is
    /// written, so a record that cannot be keyed or encoded aborts the batch
    /// untouched. With updates disallowed, existing keys are checked first and
    /// each write is also conditional; a key that appears between the check
    /// and the write fails the call with earlier records already written.
    pub async fn save(&self, records: &[T], options: SaveOptions) -> Result<()> {
        if options.expire.is_some_and(|ttl| ttl.is_zero()) {
            return Err(Error::InvalidArgument(
                "expire must be a positive duration".to_string(),
            ));
        }

        let descriptor = self.descriptor();
        let prepared = records
            .iter()
            .map(|record| {
                let key = descriptor.record_key(record)?;
                let bytes = descriptor.record_codec().encode(record)?;
                Ok((key, bytes))
            })
            .collect::<Result<Vec<_>>>()?;

        let pool = self.pool()?;
        let partition = descriptor.info().partition;

        if !options.allow_update {
            for (key, _) in &prepared {
                if pool.exists(partition, key.as_str()).await? {
                    return Err(Error::DuplicateKey(key.to_string()));
                }
            }
        }

        let set_options = SetOptions {
            ttl: options.expire,
            only_if_absent: !options.allow_update,
        };
        for (key, bytes) in prepared {
            if !pool.set(partition, key.as_str(), bytes, set_options).await? {
                return Err(Error::DuplicateKey(key.into_string()));
            }
        }

        log::debug!(
            "saved {} record(s) to {}",
            records.len(),
            descriptor.info()
        );
        Ok(())
    }

    /// Fetch a record, failing with [`Error::NotFound`] if it is absent.
    pub async fn get(&self, lookup: impl Into<Lookup<'_, T>>) -> Result<T> {
        let key = self.manager.key_of(lookup)?;
        match self.fetch(&key).await? {
            Some(record) => Ok(record),
            None => Err(Error::NotFound(key.into_string())),
        }
    }

    /// Fetch a record, or `default` if it is absent.
    pub async fn get_or(&self, lookup: impl Into<Lookup<'_, T>>, default: T) -> Result<T> {
        Ok(self.try_get(lookup).await?.unwrap_or(default))
    }

    /// Fetch a record if present.
    pub async fn try_get(&self, lookup: impl Into<Lookup<'_, T>>) -> Result<Option<T>> {
        let key = self.manager.key_of(lookup)?;
        self.fetch(&key).await
    }

    pub(crate) async fn fetch(&self, key: &StorageKey) -> Result<Option<T>> {
        let pool = self.pool()?;
        let partition = self.descriptor().info().partition;
        match pool.get(partition, key.as_str()).await? {
            Some(bytes) => Ok(Some(self.descriptor().record_codec().decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Remove records. Absent keys are ignored.
    pub async fn delete<'a, I, L>(&self, lookups: I) -> Result<()>
    where
        I: IntoIterator<Item = L>,
        L: Into<Lookup<'a, T>>,
    {
        let keys = lookups
            .into_iter()
            .map(|lookup| self.manager.key_of(lookup))
            .collect::<Result<Vec<_>>>()?;

        let pool = self.pool()?;
        let partition = self.descriptor().info().partition;
        for key in &keys {
            pool.delete(partition, key.as_str()).await?;
        }
        Ok(())
    }

    /// Set the remaining lifetime of an existing record.
    pub async fn expire(&self, lookup: impl Into<Lookup<'_, T>>, ttl: Duration) -> Result<()> {
        if ttl.is_zero() {
            return Err(Error::InvalidArgument(
                "ttl must be a positive duration".to_string(),
            ));
        }

        let key = self.manager.key_of(lookup)?;
        let pool = self.pool()?;
        let partition = self.descriptor().info().partition;
        if pool.expire(partition, key.as_str(), ttl).await? {
            Ok(())
        } else {
            Err(Error::NotFound(key.into_string()))
        }
    }

    /// Lazily iterate every stored record of this resource.
    ///
    /// Each call starts a fresh scan.
    pub fn iter(&self) -> Cursor<'s, T> {
        Cursor::new(*self, Filter::new())
    }

    /// Lazily iterate the records matching `filter`.
    ///
    /// The store cannot evaluate filters, so this always reads the whole
    /// collection and tests each record.
    pub fn filter(&self, filter: Filter) -> Result<Cursor<'s, T>> {
        filter.check_fields::<T>()?;
        Ok(Cursor::new(*self, filter))
    }

    /// Key values of every record currently stored.
    pub async fn keys(&self) -> Result<Vec<String>> {
        let raw = self.scan().await?;
        let descriptor = self.descriptor();
        Ok(raw
            .iter()
            .filter_map(|key| match descriptor.key_value_of(key) {
                Ok(value) => Some(value),
                Err(e) => {
                    log::warn!("skipping key in {}: {}", descriptor.info(), e);
                    None
                }
            })
            .collect())
    }

    pub(crate) async fn scan(&self) -> Result<Vec<String>> {
        let pool = self.pool()?;
        let descriptor = self.descriptor();
        let keys = pool
            .scan_keys(descriptor.info().partition, &descriptor.scan_prefix())
            .await?;
        Ok(keys)
    }
}

//! Lazy iteration over a resource's records.

use std::vec;

use keyform_core_store::{Error, Result, Shape};
use keyform_serde_store::Filter;

use crate::manager::Bound;

/// A lazy, single-pass walk over the records of one resource.
///
/// The key scan runs on the first call to [`next`](Cursor::next); each
/// record is then read and decoded only when it is reached. Records written
/// after the scan are not seen, and records removed after it are skipped.
pub struct Cursor<'s, T> {
    bound: Bound<'s, T>,
    filter: Filter,
    keys: Option<vec::IntoIter<String>>,
    done: bool,
}

impl<'s, T: Shape> Cursor<'s, T> {
    pub(crate) fn new(bound: Bound<'s, T>, filter: Filter) -> Self {
        Self {
            bound,
            filter,
            keys: None,
            done: false,
        }
    }

    /// The next record, or `None` once the scan is exhausted.
    ///
    /// Entries whose key or bytes do not belong to this resource are logged
    /// and skipped. A store error is returned once and ends the cursor.
    #[allow(clippy::should_implement_trait)]
    pub async fn next(&mut self) -> Option<Result<T>> {
        loop {
            if self.done {
                return None;
            }

            if self.keys.is_none() {
                match self.bound.scan().await {
                    Ok(keys) => self.keys = Some(keys.into_iter()),
                    Err(e) => return self.fail(e),
                }
            }

            let raw = match self.keys.as_mut().and_then(Iterator::next) {
                Some(raw) => raw,
                None => {
                    self.done = true;
                    return None;
                }
            };

            match self.read(&raw).await {
                Ok(Some(record)) => return Some(Ok(record)),
                Ok(None) => continue,
                Err(e @ (Error::Validation(_) | Error::MalformedKey { .. } | Error::Encoding(_))) => {
                    log::warn!(
                        "skipping entry {:?} of {}: {}",
                        raw,
                        self.bound.manager().info(),
                        e
                    );
                }
                Err(e) => return self.fail(e),
            }
        }
    }

    /// Drain the cursor, stopping at the first store error.
    pub async fn try_collect(mut self) -> Result<Vec<T>> {
        let mut records = Vec::new();
        while let Some(record) = self.next().await {
            records.push(record?);
        }
        Ok(records)
    }

    /// Read one scanned key. `Ok(None)` means the key vanished or the
    /// record does not match the filter.
    async fn read(&self, raw: &str) -> Result<Option<T>> {
        let descriptor = self.bound.manager().descriptor();
        let value = descriptor.key_value_of(raw)?;
        let key = descriptor.storage_key(&value)?;

        let record = match self.bound.fetch(&key).await? {
            Some(record) => record,
            None => return Ok(None),
        };

        if self.filter.is_empty() {
            return Ok(Some(record));
        }
        let fields = descriptor.record_codec().to_fields(&record)?;
        Ok(self.filter.matches(&fields).then_some(record))
    }

    fn fail(&mut self, e: Error) -> Option<Result<T>> {
        self.done = true;
        Some(Err(e))
    }
}

//! Cache Store Module
//!
//! Holds the latest known value per key with its write timestamp, and
//! optionally mirrors writes to durable storage on a best-effort basis.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::cache::durable::{DurableResult, DurableStorage};
use crate::cache::{CacheEntry, CacheStats};
use crate::error::DurableError;

/// A cache store shared between consumers.
pub type SharedStore<V> = Arc<RwLock<CacheStore<V>>>;

// == Cache Store ==
/// In-memory key/value store with per-key write timestamps.
///
/// Entries are never evicted or expired here; freshness is judged by the
/// caller through [`crate::cache::is_valid`].
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Key -> latest entry
    entries: HashMap<String, CacheEntry<V>>,
    /// Optional durable mirror
    durable: Option<Box<dyn DurableStorage>>,
    /// Performance statistics
    stats: CacheStats,
}

impl<V> Default for CacheStore<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            durable: None,
            stats: CacheStats::new(),
        }
    }
}

impl<V> CacheStore<V>
where
    V: Clone + Serialize + DeserializeOwned,
{
    // == Constructors ==
    /// Creates a memory-only store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that can mirror writes to `durable`.
    pub fn with_durable(durable: impl DurableStorage + 'static) -> Self {
        Self {
            durable: Some(Box::new(durable)),
            ..Self::default()
        }
    }

    /// Wraps the store for sharing between consumers.
    pub fn shared(self) -> SharedStore<V> {
        Arc::new(RwLock::new(self))
    }

    // == Get ==
    /// Retrieves the value for `key`.
    ///
    /// With `use_durable`, durable storage is consulted first and memory is
    /// the fallback; otherwise only memory is read. Durable failures and
    /// malformed durable text count as "not there".
    pub fn get(&mut self, key: &str, use_durable: bool) -> Option<V> {
        if use_durable {
            if let Some(value) = self.read_durable(key) {
                self.stats.record_hit();
                return Some(value);
            }
        }

        match self.entries.get(key) {
            Some(entry) => {
                let value = entry.value.clone();
                self.stats.record_hit();
                Some(value)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Set ==
    /// Stores `value` under `key`, replacing any previous entry.
    ///
    /// Memory and timestamp are always written. With `persist`, the value is
    /// also written to durable storage; a failure there is logged and
    /// otherwise ignored.
    pub fn set(&mut self, key: impl Into<String>, value: V, persist: bool) {
        let key = key.into();

        if persist {
            self.write_durable(&key, &value);
        }

        let entry = CacheEntry::new(key.clone(), value);
        self.entries.insert(key, entry);
        self.stats.set_total_entries(self.entries.len());
    }

    // == Timestamp ==
    /// Returns when `key` was last written to memory (Unix ms).
    pub fn get_timestamp(&self, key: &str) -> Option<u64> {
        self.entries.get(key).map(|entry| entry.written_at)
    }

    /// Returns the in-memory entry for `key` without touching statistics.
    pub fn entry(&self, key: &str) -> Option<&CacheEntry<V>> {
        self.entries.get(key)
    }

    // == Clear Persisted ==
    /// Removes the durable copy of `key`. The in-memory entry is kept.
    ///
    /// Returns false if there is no durable storage or the removal failed.
    pub fn clear_persisted(&mut self, key: &str) -> bool {
        let Some(durable) = self.durable.as_ref() else {
            return false;
        };

        match durable.remove_item(key) {
            Ok(()) => {
                debug!(key, "Cleared persisted entry");
                true
            }
            Err(e) => {
                self.swallow(e);
                false
            }
        }
    }

    // == Lookup Accounting ==
    /// Records a lookup answered from the cache.
    pub fn record_hit(&mut self) {
        self.stats.record_hit();
    }

    /// Records a lookup the cache could not answer.
    pub fn record_miss(&mut self) {
        self.stats.record_miss();
    }

    // == Fetch Accounting ==
    /// Records a completed fetch operation.
    pub fn record_fetch(&mut self) {
        self.stats.record_fetch();
    }

    /// Records a failed fetch operation.
    pub fn record_fetch_failure(&mut self) {
        self.stats.record_fetch_failure();
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    /// Returns true if writes can be mirrored to durable storage.
    pub fn has_durable(&self) -> bool {
        self.durable.is_some()
    }

    /// Returns the number of in-memory entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is cached in memory.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Durable Helpers ==
    fn read_durable(&mut self, key: &str) -> Option<V> {
        let durable = self.durable.as_ref()?;
        match try_read(durable.as_ref(), key) {
            Ok(value) => value,
            Err(e) => {
                self.swallow(e);
                None
            }
        }
    }

    fn write_durable(&mut self, key: &str, value: &V) {
        let Some(durable) = self.durable.as_ref() else {
            return;
        };
        if let Err(e) = try_write(durable.as_ref(), key, value) {
            self.swallow(e);
        }
    }

    fn swallow(&mut self, error: DurableError) {
        warn!("Durable storage error ignored: {}", error);
        self.stats.record_durable_error();
    }
}

fn try_read<V: DeserializeOwned>(durable: &dyn DurableStorage, key: &str) -> DurableResult<Option<V>> {
    let Some(text) = durable.get_item(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&text)
        .map(Some)
        .map_err(|source| DurableError::Malformed {
            key: key.to_string(),
            source,
        })
}

fn try_write<V: Serialize>(durable: &dyn DurableStorage, key: &str, value: &V) -> DurableResult<()> {
    let text = serde_json::to_string(value).map_err(|source| DurableError::Serialize {
        key: key.to_string(),
        source,
    })?;
    durable.set_item(key, &text)
}

//! TTL-Gated Fetch Wrapper
//!
//! A `CachedFetch` is one consumer of the shared store. It serves a cached
//! value while it is fresh and otherwise runs the caller's fetch operation,
//! publishing `{data, loading}` through a watch channel.

use std::fmt::Display;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::watch;
use tracing::{debug, error};

use crate::cache::{
    current_timestamp_ms, is_valid_at, CacheEntry, EmptyPolicy, Payload, SharedStore,
};

/// TTL used when the consumer does not pick one.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

// == Fetch State ==
/// What a consumer currently shows.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchState<V> {
    /// Latest data, None until something was served
    pub data: Option<V>,
    /// True while a fetch operation is in flight
    pub loading: bool,
}

impl<V> Default for FetchState<V> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
        }
    }
}

// == Fetch Outcome ==
/// How a single `load` call ended.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome<V> {
    /// Served from the store without fetching
    Cached(CacheEntry<V>),
    /// Fetched and written to the store; `written_at` is the stamp of that write
    Fetched(CacheEntry<V>),
    /// The fetch operation failed; state kept its previous data
    Failed,
    /// The consumer was unmounted; the result was dropped
    Discarded,
}

impl<V> FetchOutcome<V> {
    /// Returns the data this call produced, if any.
    pub fn data(&self) -> Option<&V> {
        self.entry().map(|entry| &entry.value)
    }

    /// Consumes the outcome, returning its data.
    pub fn into_data(self) -> Option<V> {
        match self {
            FetchOutcome::Cached(entry) | FetchOutcome::Fetched(entry) => Some(entry.value),
            FetchOutcome::Failed | FetchOutcome::Discarded => None,
        }
    }

    /// Returns the store entry that was served or written.
    pub fn entry(&self) -> Option<&CacheEntry<V>> {
        match self {
            FetchOutcome::Cached(entry) | FetchOutcome::Fetched(entry) => Some(entry),
            FetchOutcome::Failed | FetchOutcome::Discarded => None,
        }
    }

    /// Write timestamp of the entry behind the data (Unix ms).
    pub fn written_at(&self) -> Option<u64> {
        self.entry().map(|entry| entry.written_at)
    }
}

// == Unmount Handle ==
/// Unmounts a consumer from another task.
#[derive(Debug, Clone)]
pub struct UnmountHandle {
    mounted: Arc<AtomicBool>,
}

impl UnmountHandle {
    /// Marks the consumer as gone. Results resolving afterwards are dropped.
    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
    }

    /// Returns true while the consumer is mounted.
    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }
}

// == Cached Fetch ==
/// A consumer loading keys through the shared store.
///
/// `load` takes `&mut self`, so a consumer has at most one fetch in flight.
/// Separate consumers asking for the same key each run their own fetch.
#[derive(Debug)]
pub struct CachedFetch<V> {
    store: SharedStore<V>,
    policy: EmptyPolicy,
    mounted: Arc<AtomicBool>,
    state: watch::Sender<FetchState<V>>,
}

impl<V> CachedFetch<V>
where
    V: Clone + Payload + Serialize + DeserializeOwned,
{
    /// Mounts a new consumer over `store`.
    pub fn new(store: SharedStore<V>) -> Self {
        let (state, _) = watch::channel(FetchState::default());
        Self {
            store,
            policy: EmptyPolicy::default(),
            mounted: Arc::new(AtomicBool::new(true)),
            state,
        }
    }

    /// Sets how empty cached values are judged.
    pub fn with_policy(mut self, policy: EmptyPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Snapshot of the current `{data, loading}` state.
    pub fn state(&self) -> FetchState<V> {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<FetchState<V>> {
        self.state.subscribe()
    }

    /// Handle that can unmount this consumer from elsewhere.
    pub fn unmount_handle(&self) -> UnmountHandle {
        UnmountHandle {
            mounted: Arc::clone(&self.mounted),
        }
    }

    /// Unmounts the consumer.
    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
    }

    /// Returns true while the consumer is mounted.
    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    /// Loads `key` with the default five minute TTL.
    pub async fn load_default<F, Fut, E>(&mut self, key: &str, fetch: F) -> FetchOutcome<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
        E: Display,
    {
        self.load(key, DEFAULT_TTL, fetch).await
    }

    // == Load ==
    /// Serves `key` from the store if fresh, otherwise runs `fetch`.
    ///
    /// A fetched value is written to memory only, never to durable storage.
    /// On failure the error is logged and the previous data is kept. Call
    /// again with the new arguments whenever `key` or `ttl` changes.
    pub async fn load<F, Fut, E>(&mut self, key: &str, ttl: Duration, fetch: F) -> FetchOutcome<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
        E: Display,
    {
        if !self.is_mounted() {
            return FetchOutcome::Discarded;
        }

        // Lookup statistics follow freshness, not mere presence
        let cached = {
            let mut store = self.store.write().await;
            let fresh = store.entry(key).and_then(|entry| {
                is_valid_at(
                    Some(&entry.value),
                    ttl,
                    Some(entry.written_at),
                    self.policy,
                    current_timestamp_ms(),
                )
                .then(|| entry.clone())
            });
            if fresh.is_some() {
                store.record_hit();
            } else {
                store.record_miss();
            }
            fresh
        };

        if let Some(entry) = cached {
            debug!(key, "Serving fresh cached value");
            let data = entry.value.clone();
            self.state.send_modify(|state| {
                state.data = Some(data);
                state.loading = false;
            });
            return FetchOutcome::Cached(entry);
        }

        debug!(key, ttl_ms = ttl.as_millis() as u64, "Cache miss, fetching");
        self.state.send_modify(|state| state.loading = true);

        // No lock is held while the fetch is pending
        let result = fetch().await;

        if !self.is_mounted() {
            debug!(key, "Consumer unmounted, dropping fetch result");
            return FetchOutcome::Discarded;
        }

        match result {
            Ok(value) => {
                let entry = {
                    let mut store = self.store.write().await;
                    store.set(key, value.clone(), false);
                    store.record_fetch();
                    CacheEntry::with_timestamp(
                        key,
                        value,
                        store.get_timestamp(key).unwrap_or_else(current_timestamp_ms),
                    )
                };
                let data = entry.value.clone();
                self.state.send_modify(|state| {
                    state.data = Some(data);
                    state.loading = false;
                });
                FetchOutcome::Fetched(entry)
            }
            Err(e) => {
                error!(key, "Fetch failed: {}", e);
                self.store.write().await.record_fetch_failure();
                self.state.send_modify(|state| state.loading = false);
                FetchOutcome::Failed
            }
        }
    }
}

//! Namespaced TTL cache over a `Storage` backend.
//!
//! # Responsibilities
//! - Serve payloads that are younger than their TTL
//! - Lazily delete expired or unreadable entries on read
//! - On a quota failure, sweep entries older than 2 × their TTL and retry once
//!
//! # Design Decisions
//! - Best-effort: write failures are logged and swallowed, never surfaced
//! - No background sweeper; eviction only happens on read or under pressure

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::clock::{Clock, SystemClock};
use crate::cache::entry::CacheEntry;
use crate::cache::error::CacheError;
use crate::cache::storage::{MemoryStorage, Storage};
use crate::observability::metrics;

/// Default prefix for keys written by the cache.
pub const DEFAULT_NAMESPACE: &str = "storefront_cache_";

/// Session-scoped response cache. Cloning shares the same backend.
#[derive(Clone)]
pub struct TtlCache {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    namespace: String,
}

impl std::fmt::Debug for TtlCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl TtlCache {
    pub fn new(storage: Arc<dyn Storage>, namespace: impl Into<String>) -> Self {
        Self {
            storage,
            clock: Arc::new(SystemClock),
            namespace: namespace.into(),
        }
    }

    /// Unbounded in-memory cache under the default namespace.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()), DEFAULT_NAMESPACE)
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn storage_key(&self, key: &str) -> String {
        format!("{}{}", self.namespace, key)
    }

    fn namespaced_keys(&self) -> Vec<String> {
        self.storage
            .keys()
            .into_iter()
            .filter(|k| k.starts_with(&self.namespace))
            .collect()
    }

    /// Payload for `key` if present and unexpired.
    pub fn get_value(&self, key: &str) -> Option<Value> {
        let storage_key = self.storage_key(key);
        let Some(raw) = self.storage.get_item(&storage_key) else {
            metrics::record_cache_lookup("miss");
            return None;
        };

        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Dropping unreadable cache entry");
                self.storage.remove_item_if(&storage_key, &raw);
                metrics::record_cache_lookup("miss");
                return None;
            }
        };

        if !entry.is_valid(self.clock.now_ms()) {
            tracing::trace!(key = %key, "Cache entry expired");
            // a concurrent refresh may have replaced it since the read
            self.storage.remove_item_if(&storage_key, &raw);
            metrics::record_cache_lookup("expired");
            return None;
        }

        metrics::record_cache_lookup("hit");
        Some(entry.payload)
    }

    /// Typed payload for `key`. A payload of a different shape counts as a miss.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get_value(key)?;
        match serde_json::from_value(value) {
            Ok(data) => Some(data),
            Err(e) => {
                tracing::debug!(key = %key, error = %e, "Cached payload does not match requested type");
                None
            }
        }
    }

    /// Store `data` under `key` for `ttl`. Never fails from the caller's point of view.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, data: &T, ttl: Duration) {
        match serde_json::to_value(data) {
            Ok(payload) => self.set_value(key, payload, ttl),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache write dropped: payload not serializable");
                metrics::record_cache_dropped_write("serialization");
            }
        }
    }

    pub fn set_value(&self, key: &str, payload: Value, ttl: Duration) {
        let entry = CacheEntry::new(key, payload, self.clock.now_ms(), ttl);
        if entry.ttl == 0 {
            tracing::debug!(key = %key, "Cache write skipped: TTL under one millisecond");
            return;
        }

        let storage_key = self.storage_key(key);

        let err = match self.write(&storage_key, &entry) {
            Ok(()) => return,
            Err(err) => err,
        };

        if !err.is_quota() {
            tracing::warn!(key = %key, error = %err, "Cache write dropped");
            metrics::record_cache_dropped_write("storage");
            return;
        }

        let evicted = self.evict_stale();
        tracing::debug!(key = %key, evicted, "Storage full; retrying cache write after sweep");

        if let Err(err) = self.write(&storage_key, &entry) {
            tracing::warn!(key = %key, error = %err, "Cache write dropped after eviction");
            metrics::record_cache_dropped_write("quota");
        }
    }

    fn write(&self, storage_key: &str, entry: &CacheEntry) -> Result<(), CacheError> {
        let raw = serde_json::to_string(entry)?;
        self.storage.set_item(storage_key, &raw)?;
        Ok(())
    }

    /// Remove one entry. Missing keys are ignored.
    pub fn invalidate(&self, key: &str) {
        self.storage.remove_item(&self.storage_key(key));
    }

    /// Remove every entry under this namespace; other keys in the backend are untouched.
    pub fn clear(&self) {
        let keys = self.namespaced_keys();
        for key in &keys {
            self.storage.remove_item(key);
        }
        tracing::debug!(namespace = %self.namespace, removed = keys.len(), "Cache cleared");
    }

    /// Remove entries older than twice their TTL, plus unreadable ones.
    /// Returns how many were removed.
    pub fn evict_stale(&self) -> usize {
        let now = self.clock.now_ms();
        let mut evicted = 0;

        for storage_key in self.namespaced_keys() {
            let Some(raw) = self.storage.get_item(&storage_key) else {
                continue;
            };
            let stale = serde_json::from_str::<CacheEntry>(&raw)
                .map(|entry| entry.is_evictable(now))
                .unwrap_or(true);
            if stale && self.storage.remove_item_if(&storage_key, &raw) {
                evicted += 1;
            }
        }

        metrics::record_cache_evictions(evicted);
        evicted
    }
}

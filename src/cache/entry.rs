//! Persisted cache record.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// One cached response payload, stored as JSON under a namespaced key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Caller-facing key (without the namespace prefix).
    pub key: String,
    /// Decoded response body.
    pub payload: Value,
    /// Insertion time, milliseconds since the Unix epoch.
    pub stored_at: u64,
    /// Validity window in milliseconds.
    pub ttl: u64,
}

impl CacheEntry {
    pub fn new(key: impl Into<String>, payload: Value, stored_at: u64, ttl: Duration) -> Self {
        Self {
            key: key.into(),
            payload,
            stored_at,
            ttl: u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX),
        }
    }

    pub fn age(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.stored_at)
    }

    /// Valid iff `now - stored_at < ttl`.
    pub fn is_valid(&self, now_ms: u64) -> bool {
        self.age(now_ms) < self.ttl
    }

    /// Storage-pressure sweeps remove entries older than twice their TTL.
    pub fn is_evictable(&self, now_ms: u64) -> bool {
        self.age(now_ms) > self.ttl.saturating_mul(2)
    }
}

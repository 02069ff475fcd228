//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the fetch layer.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::resilience::FetchPolicy;

/// Root configuration for the storefront fetch layer.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct StorefrontConfig {
    /// Upstream admin API settings.
    pub api: ApiConfig,

    /// Default per-call fetch policy.
    pub fetch: FetchConfig,

    /// Response cache settings.
    pub cache: CacheConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Upstream admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Root URL that relative request paths are joined onto.
    pub base_url: Option<String>,

    /// Shared secret for on-demand revalidation hooks.
    /// Carried for collaborators; the fetch layer never reads it.
    pub revalidation_secret: Option<String>,

    /// User-Agent sent with every upstream request.
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            revalidation_secret: None,
            user_agent: concat!("storefront-fetch/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Fetch policy defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Hard deadline for a single attempt in milliseconds.
    pub timeout_ms: u64,

    /// Additional attempts after the first failure.
    pub max_retries: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub retry_delay_base_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            max_retries: 3,
            retry_delay_base_ms: 1_000,
        }
    }
}

impl FetchConfig {
    /// Build the default fetch policy from configuration.
    pub fn policy(&self) -> FetchPolicy {
        FetchPolicy {
            timeout: Duration::from_millis(self.timeout_ms),
            max_retries: self.max_retries,
            retry_delay_base: Duration::from_millis(self.retry_delay_base_ms),
            cache_ttl: None,
        }
    }
}

/// Storage backend behind the response cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process-local map; cleared when the process exits.
    Memory,
    /// JSON document on disk; survives across invocations.
    File,
}

/// Response cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Prefix applied to every key written by the cache.
    pub namespace: String,

    /// TTL used when a caller does not supply one, in milliseconds.
    pub default_ttl_ms: u64,

    /// Byte quota for the storage backend (keys + values). `None` = unbounded.
    pub quota_bytes: Option<usize>,

    /// Which storage backend to use.
    pub backend: StorageBackend,

    /// Path of the JSON document for the file backend.
    pub path: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            namespace: "storefront_cache_".to_string(),
            default_ttl_ms: 5 * 60 * 1000,
            quota_bytes: Some(5 * 1024 * 1024), // 5MB, same as a browser session store
            backend: StorageBackend::Memory,
            path: None,
        }
    }
}

impl CacheConfig {
    pub fn default_ttl(&self) -> Duration {
        Duration::from_millis(self.default_ttl_ms)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of the human-readable format.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

//! Per-call fetch policy.

use std::time::Duration;

/// Timeout, retry and caching knobs for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPolicy {
    /// Hard wall-clock bound on a single attempt.
    pub timeout: Duration,
    /// Additional attempts after the first failure.
    pub max_retries: u32,
    /// Base of the exponential backoff: `base × 2^retry_index`.
    pub retry_delay_base: Duration,
    /// Validity window for cached responses, when caching is requested.
    pub cache_ttl: Option<Duration>,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(10_000),
            max_retries: 3,
            retry_delay_base: Duration::from_millis(1_000),
            cache_ttl: None,
        }
    }
}

impl FetchPolicy {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_delay_base(mut self, base: Duration) -> Self {
        self.retry_delay_base = base;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    /// Policy with no retries.
    pub fn no_retry(self) -> Self {
        self.with_max_retries(0)
    }

    /// Total attempts the executor will make at most.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

//! Storefront fetch client.
//!
//! # Data Flow
//! ```text
//! cached_fetch(url, options)
//!     → cache::TtlCache (hit? return, optionally refresh in background)
//!     → dedup::PendingRequestRegistry (join or start the shared call)
//!     → resilience::RetryExecutor (attempt loop with backoff)
//!     → http::Transport (one network attempt under a deadline)
//! ```
//!
//! `fetch_parallel` fans out over `fetch_with_retry`; it bypasses the cache.

pub mod parallel;
pub mod storefront;

pub use storefront::{BuildError, CachedFetchOptions, ClientBuilder, StorefrontClient, DEFAULT_CACHE_TTL};

//! Client-side fetch and caching layer for a storefront backed by an admin API.
//!
//! Every upstream read goes through a per-attempt timeout, retry with
//! exponential backoff, in-flight deduplication and a namespaced TTL cache.

pub mod cache;
pub mod client;
pub mod config;
pub mod dedup;
pub mod error;
pub mod http;
pub mod observability;
pub mod resilience;

#[cfg(test)]
mod testing;

pub use cache::TtlCache;
pub use client::{CachedFetchOptions, StorefrontClient};
pub use config::StorefrontConfig;
pub use error::{FetchError, FetchResult};
pub use http::{HttpTransport, RequestOptions, Transport};
pub use resilience::FetchPolicy;

//! Metrics collection.
//!
//! # Metrics
//! - `storefront_fetch_attempts_total` (counter): attempts by outcome
//! - `storefront_fetch_retries_total` (counter): retries by error kind
//! - `storefront_fetch_duration_seconds` (histogram): logical fetch latency
//! - `storefront_dedup_joins_total` (counter): callers joined onto an in-flight request
//! - `storefront_cache_lookups_total` (counter): hits / misses / expired
//! - `storefront_cache_evictions_total` (counter): entries removed by pressure sweeps
//! - `storefront_cache_dropped_writes_total` (counter): writes given up on
//! - `storefront_cache_revalidations_total` (counter): background refreshes by outcome
//!
//! Uses the `metrics` facade only; without an installed recorder every call is a no-op.

use metrics::{counter, histogram};
use std::time::Instant;

pub fn record_attempt(outcome: &'static str) {
    counter!("storefront_fetch_attempts_total", "outcome" => outcome).increment(1);
}

pub fn record_retry(reason: &'static str) {
    counter!("storefront_fetch_retries_total", "reason" => reason).increment(1);
}

/// Record the latency of a logical fetch (all attempts included).
pub fn record_fetch(outcome: &'static str, start: Instant) {
    histogram!("storefront_fetch_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_dedup_join() {
    counter!("storefront_dedup_joins_total").increment(1);
}

pub fn record_cache_lookup(result: &'static str) {
    counter!("storefront_cache_lookups_total", "result" => result).increment(1);
}

pub fn record_cache_evictions(count: usize) {
    counter!("storefront_cache_evictions_total").increment(count as u64);
}

pub fn record_cache_dropped_write(reason: &'static str) {
    counter!("storefront_cache_dropped_writes_total", "reason" => reason).increment(1);
}

pub fn record_revalidation(outcome: &'static str) {
    counter!("storefront_cache_revalidations_total", "outcome" => outcome).increment(1);
}

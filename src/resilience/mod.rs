//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to the admin API:
//!     → retries.rs (loop over attempts, classify failures)
//!         → timeouts.rs (enforce the per-attempt deadline)
//!             → http::Transport (one network attempt)
//!         → backoff.rs (delay before the next attempt)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every attempt has a deadline
//! - Only server-class and connection-level failures are retried
//! - Backoff is exponential without jitter

pub mod backoff;
pub mod policy;
pub mod retries;
pub mod timeouts;

pub use policy::FetchPolicy;
pub use retries::RetryExecutor;

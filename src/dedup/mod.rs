//! Request deduplication.
//!
//! # Data Flow
//! ```text
//! fetch_deduplicated(url, options)
//!     → key = url + canonical(options)
//!     → registry.rs: pending? join it : spawn executor call and register it
//!     → on settlement: entry removed, outcome cloned to every joined caller
//! ```
//!
//! # Design Decisions
//! - One registry per client instance, not a process global
//! - The shared call runs on its own task so a dropped caller cannot
//!   leave a key locked

pub mod registry;

pub use registry::{PendingRequestRegistry, SharedOutcome};

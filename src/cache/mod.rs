//! Response caching subsystem.
//!
//! # Data Flow
//! ```text
//! get(key)
//!     → storage.rs (namespaced lookup)
//!     → entry.rs (valid iff now - stored_at < ttl; expired → deleted)
//!
//! set(key, payload, ttl)
//!     → storage.rs write
//!     → quota exceeded? ttl.rs sweep (age > 2 × ttl) → one retry → else drop
//! ```
//!
//! # Design Decisions
//! - Cache is best-effort and never a correctness dependency
//! - Storage is pluggable: anything with get/set/remove/keys works
//! - Timestamps come from a `Clock` so expiry is testable

pub mod clock;
pub mod entry;
pub mod error;
pub mod storage;
pub mod ttl;

pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use error::{CacheError, StorageError};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use ttl::{TtlCache, DEFAULT_NAMESPACE};

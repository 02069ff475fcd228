//! Cache error types. None of these ever reach a caller of the cache.

use thiserror::Error;

/// Failure of a storage backend operation.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Writing would exceed the backend's byte quota.
    #[error("storage quota exceeded: {needed} bytes needed, {available} available")]
    QuotaExceeded { needed: usize, available: usize },

    /// Persisting the backend failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted document is not valid JSON.
    #[error("corrupt storage document: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Failure to write a cache entry.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to serialize cache entry: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl CacheError {
    pub fn is_quota(&self) -> bool {
        matches!(self, CacheError::Storage(StorageError::QuotaExceeded { .. }))
    }
}

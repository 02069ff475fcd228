//! Key-value storage backends for the response cache.
//!
//! The cache needs exactly four operations from its backend, modelled on a
//! browser session store: get, set, remove and key enumeration.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::cache::error::StorageError;

/// String-keyed, string-valued store.
pub trait Storage: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;

    /// Fails with `StorageError::QuotaExceeded` when the write does not fit.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing a missing key is a no-op.
    fn remove_item(&self, key: &str);

    /// Remove `key` only while it still holds `expected`. Returns whether it was removed.
    fn remove_item_if(&self, key: &str, expected: &str) -> bool {
        if self.get_item(key).as_deref() != Some(expected) {
            return false;
        }
        self.remove_item(key);
        true
    }

    fn keys(&self) -> Vec<String>;
}

#[derive(Debug, Default)]
struct MemoryState {
    items: HashMap<String, String>,
    /// Sum of key and value lengths.
    used: usize,
}

/// In-process store with an optional byte quota.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    state: Mutex<MemoryState>,
    quota: Option<usize>,
}

impl MemoryStorage {
    /// Unbounded store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store limited to `quota` bytes of keys plus values.
    pub fn with_quota(quota: usize) -> Self {
        Self {
            state: Mutex::default(),
            quota: Some(quota),
        }
    }

    /// Bytes currently used.
    pub fn used(&self) -> usize {
        self.lock().used
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        // the state is a plain map; a panicked writer cannot leave it half-updated
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn snapshot(&self) -> HashMap<String, String> {
        self.lock().items.clone()
    }

    /// Put `key` back to `value` (or absent) without quota enforcement.
    fn put_back(&self, key: &str, value: Option<String>) {
        let mut state = self.lock();
        if let Some(old) = state.items.remove(key) {
            state.used -= key.len() + old.len();
        }
        if let Some(value) = value {
            state.used += key.len() + value.len();
            state.items.insert(key.to_string(), value);
        }
    }

    /// Insert without quota enforcement (used when loading persisted state).
    fn restore(&self, items: HashMap<String, String>) {
        let mut state = self.lock();
        state.used = items.iter().map(|(k, v)| k.len() + v.len()).sum();
        state.items = items;
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.lock().items.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut state = self.lock();
        let previous = state.items.get(key).map(|v| key.len() + v.len()).unwrap_or(0);
        let needed = key.len() + value.len();
        let used_without = state.used - previous;

        if let Some(quota) = self.quota {
            if used_without + needed > quota {
                return Err(StorageError::QuotaExceeded {
                    needed,
                    available: quota.saturating_sub(used_without),
                });
            }
        }

        state.items.insert(key.to_string(), value.to_string());
        state.used = used_without + needed;
        Ok(())
    }

    fn remove_item(&self, key: &str) {
        let mut state = self.lock();
        if let Some(value) = state.items.remove(key) {
            state.used -= key.len() + value.len();
        }
    }

    fn remove_item_if(&self, key: &str, expected: &str) -> bool {
        let mut state = self.lock();
        if state.items.get(key).map(String::as_str) != Some(expected) {
            return false;
        }
        state.items.remove(key);
        state.used -= key.len() + expected.len();
        true
    }

    fn keys(&self) -> Vec<String> {
        self.lock().items.keys().cloned().collect()
    }
}

/// `MemoryStorage` persisted to a JSON document after every mutation.
///
/// Mutations are serialized so the document on disk always reflects the
/// latest committed state.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    memory: MemoryStorage,
    writes: Mutex<()>,
}

impl FileStorage {
    /// Open the store at `path`, loading existing contents if the file exists.
    pub fn open(path: impl AsRef<Path>, quota: Option<usize>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let memory = match quota {
            Some(quota) => MemoryStorage::with_quota(quota),
            None => MemoryStorage::new(),
        };

        if path.exists() {
            let reader = BufReader::new(File::open(&path)?);
            let items: HashMap<String, String> = serde_json::from_reader(reader)?;
            tracing::debug!(path = %path.display(), entries = items.len(), "Loaded cache storage");
            memory.restore(items);
        }

        Ok(Self {
            path,
            memory,
            writes: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the whole document via a temp file and rename.
    fn persist(&self) -> Result<(), StorageError> {
        let items = self.memory.snapshot();
        let tmp = self.path.with_extension("tmp");
        {
            let mut writer = BufWriter::new(File::create(&tmp)?);
            serde_json::to_writer(&mut writer, &items)?;
            writer.flush()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn persist_or_warn(&self) {
        if let Err(e) = self.persist() {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to persist cache storage");
        }
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.memory.get_item(key)
    }

    /// On a failed persist the in-memory value is rolled back, so an `Err`
    /// always means nothing was written.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _writes = self.writes.lock().unwrap_or_else(|e| e.into_inner());
        let previous = self.memory.get_item(key);
        self.memory.set_item(key, value)?;

        if let Err(e) = self.persist() {
            self.memory.put_back(key, previous);
            return Err(e);
        }
        Ok(())
    }

    fn remove_item(&self, key: &str) {
        let _writes = self.writes.lock().unwrap_or_else(|e| e.into_inner());
        if self.memory.get_item(key).is_none() {
            return;
        }
        self.memory.remove_item(key);
        self.persist_or_warn();
    }

    fn remove_item_if(&self, key: &str, expected: &str) -> bool {
        let _writes = self.writes.lock().unwrap_or_else(|e| e.into_inner());
        if !self.memory.remove_item_if(key, expected) {
            return false;
        }
        self.persist_or_warn();
        true
    }

    fn keys(&self) -> Vec<String> {
        self.memory.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_roundtrip_and_remove() {
        let storage = MemoryStorage::new();
        storage.set_item("a", "1").unwrap();
        assert_eq!(storage.get_item("a").as_deref(), Some("1"));

        storage.remove_item("a");
        storage.remove_item("a");
        assert_eq!(storage.get_item("a"), None);
        assert_eq!(storage.used(), 0);
    }

    #[test]
    fn test_quota_enforced() {
        let storage = MemoryStorage::with_quota(10);
        storage.set_item("k1", "12345").unwrap(); // 7 bytes

        let err = storage.set_item("k2", "12345").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { needed: 7, available: 3 }));

        // overwriting reuses the old entry's bytes
        storage.set_item("k1", "12345678").unwrap();
        assert_eq!(storage.used(), 10);
    }

    #[test]
    fn test_file_storage_persists_across_opens() {
        let dir = std::env::temp_dir().join(format!("storefront-fetch-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("cache.json");

        {
            let storage = FileStorage::open(&path, None).unwrap();
            storage.set_item("storefront_cache_a", "{\"x\":1}").unwrap();
            storage.set_item("storefront_cache_b", "{}").unwrap();
            storage.remove_item("storefront_cache_b");
        }

        let reopened = FileStorage::open(&path, None).unwrap();
        assert_eq!(reopened.get_item("storefront_cache_a").as_deref(), Some("{\"x\":1}"));
        assert_eq!(reopened.keys().len(), 1);

        fs::remove_dir_all(&dir).unwrap_or_default();
    }

    #[test]
    fn test_remove_item_if_only_removes_expected_value() {
        let storage = MemoryStorage::new();
        storage.set_item("k", "fresh").unwrap();

        assert!(!storage.remove_item_if("k", "stale"));
        assert_eq!(storage.get_item("k").as_deref(), Some("fresh"));

        assert!(storage.remove_item_if("k", "fresh"));
        assert_eq!(storage.get_item("k"), None);
        assert_eq!(storage.used(), 0);
    }

    #[test]
    fn test_file_storage_concurrent_writers() {
        let dir = std::env::temp_dir().join(format!("storefront-fetch-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("cache.json");
        let storage = FileStorage::open(&path, None).unwrap();

        std::thread::scope(|scope| {
            for thread in 0..8 {
                let storage = &storage;
                scope.spawn(move || {
                    for i in 0..50 {
                        storage
                            .set_item(&format!("storefront_cache_{thread}_{i}"), "{}")
                            .unwrap();
                    }
                });
            }
        });

        assert_eq!(storage.keys().len(), 400);
        let reopened = FileStorage::open(&path, None).unwrap();
        assert_eq!(reopened.keys().len(), 400);

        fs::remove_dir_all(&dir).unwrap_or_default();
    }

    #[test]
    fn test_file_storage_rolls_back_failed_persist() {
        let dir = std::env::temp_dir().join(format!("storefront-fetch-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("cache.json");
        let storage = FileStorage::open(&path, None).unwrap();
        storage.set_item("storefront_cache_a", "1").unwrap();

        // the temp file cannot be created once the directory is gone
        fs::remove_dir_all(&dir).unwrap();
        assert!(storage.set_item("storefront_cache_a", "2").is_err());
        assert!(storage.set_item("storefront_cache_b", "3").is_err());

        assert_eq!(storage.get_item("storefront_cache_a").as_deref(), Some("1"));
        assert_eq!(storage.get_item("storefront_cache_b"), None);
    }

    #[test]
    fn test_file_storage_rejects_corrupt_document() {
        let dir = std::env::temp_dir().join(format!("storefront-fetch-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("cache.json");
        fs::write(&path, "not json").unwrap();

        let err = FileStorage::open(&path, None).unwrap_err();
        assert!(matches!(err, StorageError::Corrupt(_)));

        fs::remove_dir_all(&dir).unwrap_or_default();
    }
}

// Key-value persistence adapters for preference state.
// Mirrors browser local storage: string keys, string values, synchronous access.

use dashmap::DashMap;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{Result, StoreError};
use crate::json_file;

pub trait KeyValueStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
}

/// In-process storage, lost when the process exits.
#[derive(Default)]
pub struct MemoryStorage {
    items: DashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.get(key).map(|v| v.value().clone()))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// All keys in one JSON object on disk. Every `set_item` rewrites the file.
pub struct FileStorage {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path).map_err(|e| StoreError::io(&self.path, e))?;
        serde_json::from_str(&content).map_err(|e| StoreError::json(&self.path, e))
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| StoreError::storage(e.to_string()))?;
        let mut items = self.read_all()?;
        items.insert(key.to_string(), value.to_string());
        json_file::write_pretty_blocking(&self.path, &items)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Reads fail or writes fail on demand.
    #[derive(Default)]
    pub struct FailingStorage {
        pub fail_reads: bool,
        pub fail_writes: bool,
        pub inner: MemoryStorage,
    }

    impl KeyValueStorage for FailingStorage {
        fn get_item(&self, key: &str) -> Result<Option<String>> {
            if self.fail_reads {
                return Err(StoreError::storage("storage unavailable"));
            }
            self.inner.get_item(key)
        }

        fn set_item(&self, key: &str, value: &str) -> Result<()> {
            if self.fail_writes {
                return Err(StoreError::storage("quota exceeded"));
            }
            self.inner.set_item(key, value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_storage_get_set() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get_item("k").unwrap(), None);

        storage.set_item("k", "v1").unwrap();
        storage.set_item("k", "v2").unwrap();

        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("v2"));
    }

    #[test]
    fn test_file_storage_keeps_other_keys() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path().join("local-storage.json"));

        storage.set_item("a", "[\"x\"]").unwrap();
        storage.set_item("b", "{}").unwrap();

        let reopened = FileStorage::new(storage.path());
        assert_eq!(reopened.get_item("a").unwrap().as_deref(), Some("[\"x\"]"));
        assert_eq!(reopened.get_item("b").unwrap().as_deref(), Some("{}"));
        assert_eq!(reopened.get_item("c").unwrap(), None);
    }

    #[test]
    fn test_file_storage_rejects_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("local-storage.json");
        fs::write(&path, "not json").unwrap();

        let storage = FileStorage::new(&path);

        assert!(storage.get_item("a").is_err());
        assert!(storage.set_item("a", "1").is_err());
    }
}

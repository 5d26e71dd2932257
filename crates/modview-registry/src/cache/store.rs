//! Key-value backends for the enrichment cache
//!
//! A store holds `endpoint -> {timestamp, data}` entries plus a single
//! format-version marker. [`FileStore`] persists to a JSON file;
//! [`MemoryStore`] lives for the process only.

use dashmap::DashMap;
use modview_core::error::ModviewError;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::CacheResult;

/// A cached response as persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEntry {
    /// Milliseconds since the Unix epoch when the response was fetched
    pub timestamp: i64,
    /// Response body
    pub data: serde_json::Value,
}

/// Abstract persistent key-value resource behind the enrichment cache
pub trait CacheStore: Debug + Send + Sync {
    /// Format version the store was last stamped with
    fn version(&self) -> Option<u32>;

    fn set_version(&self, version: u32);

    fn get(&self, key: &str) -> Option<StoredEntry>;

    /// Insert or overwrite an entry
    fn insert(&self, key: String, entry: StoredEntry);

    fn remove(&self, key: &str) -> Option<StoredEntry>;

    fn keys(&self) -> Vec<String>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry; the version marker is left as is
    fn clear(&self);

    /// Persist pending changes
    fn flush(&self) -> CacheResult<()>;
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, StoredEntry>,
    version: Mutex<Option<u32>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryStore {
    fn version(&self) -> Option<u32> {
        *self.version.lock()
    }

    fn set_version(&self, version: u32) {
        *self.version.lock() = Some(version);
    }

    fn get(&self, key: &str) -> Option<StoredEntry> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    fn insert(&self, key: String, entry: StoredEntry) {
        self.entries.insert(key, entry);
    }

    fn remove(&self, key: &str) -> Option<StoredEntry> {
        self.entries.remove(key).map(|(_, entry)| entry)
    }

    fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.key().clone()).collect()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn clear(&self) {
        self.entries.clear();
    }

    fn flush(&self) -> CacheResult<()> {
        Ok(())
    }
}

/// On-disk layout of a [`FileStore`]
#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<u32>,
    #[serde(default)]
    entries: BTreeMap<String, StoredEntry>,
}

/// JSON file store, loaded into memory and written back on flush
#[derive(Debug)]
pub struct FileStore {
    inner: MemoryStore,
    path: PathBuf,
}

impl FileStore {
    /// Load an existing cache file or start empty.
    ///
    /// An unreadable or corrupt file is treated as an empty store and is
    /// overwritten on the next flush.
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> CacheResult<Self> {
        let path = path.as_ref().to_path_buf();
        let inner = MemoryStore::new();

        if path.exists() {
            match fs::read_to_string(&path) {
                Ok(content) => match serde_json::from_str::<CacheFile>(&content) {
                    Ok(file) => {
                        *inner.version.lock() = file.version;
                        for (key, entry) in file.entries {
                            inner.entries.insert(key, entry);
                        }
                        debug!("Loaded {} cache entries from {}", inner.len(), path.display());
                    },
                    Err(e) => {
                        warn!("Ignoring corrupt cache file {}: {}", path.display(), e);
                    },
                },
                Err(e) => {
                    warn!("Could not read cache file {}: {}", path.display(), e);
                },
            }
        }

        Ok(Self { inner, path })
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CacheStore for FileStore {
    fn version(&self) -> Option<u32> {
        self.inner.version()
    }

    fn set_version(&self, version: u32) {
        self.inner.set_version(version)
    }

    fn get(&self, key: &str) -> Option<StoredEntry> {
        self.inner.get(key)
    }

    fn insert(&self, key: String, entry: StoredEntry) {
        self.inner.insert(key, entry)
    }

    fn remove(&self, key: &str) -> Option<StoredEntry> {
        self.inner.remove(key)
    }

    fn keys(&self) -> Vec<String> {
        self.inner.keys()
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn clear(&self) {
        self.inner.clear()
    }

    fn flush(&self) -> CacheResult<()> {
        let file = CacheFile {
            version: self.inner.version(),
            entries: self
                .inner
                .entries
                .iter()
                .map(|entry| (entry.key().clone(), entry.value().clone()))
                .collect(),
        };

        let content = serde_json::to_string(&file).map_err(|e| ModviewError::CacheCorrupt {
            key: self.path.display().to_string(),
            reason: format!("failed to serialize cache: {}", e),
        })?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ModviewError::io("Failed to create cache directory".to_string(), e))?;
        }

        // Write to a sibling first so a crash never leaves a truncated file
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content)
            .map_err(|e| ModviewError::io("Failed to write cache file".to_string(), e))?;
        fs::rename(&tmp_path, &self.path)
            .map_err(|e| ModviewError::io("Failed to replace cache file".to_string(), e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn entry(timestamp: i64) -> StoredEntry {
        StoredEntry {
            timestamp,
            data: serde_json::json!({ "is_deprecated": false }),
        }
    }

    #[test]
    fn test_memory_store_operations() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        assert_eq!(store.version(), None);

        store.insert("a".to_string(), entry(1));
        store.insert("a".to_string(), entry(2));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("a").unwrap().timestamp, 2);

        store.set_version(1);
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.version(), Some(1));
    }

    #[test]
    fn test_file_store_persistence() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("cache.json");

        {
            let store = FileStore::load_or_create(&path).unwrap();
            store.set_version(3);
            store.insert("https://example.com/a/".to_string(), entry(42));
            store.flush().unwrap();
        }

        {
            let store = FileStore::load_or_create(&path).unwrap();
            assert_eq!(store.version(), Some(3));
            assert_eq!(store.get("https://example.com/a/").unwrap(), entry(42));
            assert_eq!(store.keys(), vec!["https://example.com/a/".to_string()]);
        }
    }

    #[test]
    fn test_file_store_layout() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("cache.json");

        let store = FileStore::load_or_create(&path).unwrap();
        store.set_version(1);
        store.insert("k".to_string(), entry(7));
        store.flush().unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["version"], 1);
        assert_eq!(raw["entries"]["k"]["timestamp"], 7);
        assert_eq!(raw["entries"]["k"]["data"]["is_deprecated"], false);
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("cache.json");
        fs::write(&path, "{ not json").unwrap();

        let store = FileStore::load_or_create(&path).unwrap();
        assert!(store.is_empty());
        assert_eq!(store.version(), None);

        store.flush().unwrap();
        assert!(FileStore::load_or_create(&path).unwrap().is_empty());
    }
}

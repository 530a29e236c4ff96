//! File-backed cache.
//!
//! The whole map is a single JSON object rewritten atomically on every
//! change. The file is created with owner-only permissions.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::LocalCache;
use crate::error::{LoonaError, Result};
use crate::fs::write_private_atomic;

/// Cache persisted to a JSON file.
///
/// Whether it behaves as a session or persistent cache depends on where the
/// file lives (a runtime dir cleared at logout/reboot, or a data dir).
pub struct FileCache {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        let contents = match std::fs::read(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => {
                return Err(LoonaError::Storage(format!(
                    "Failed to read cache {}: {}",
                    self.path.display(),
                    err
                )))
            }
        };
        match serde_json::from_slice(&contents) {
            Ok(map) => Ok(map),
            Err(err) => {
                // Corrupt cache contents are discarded rather than trusted.
                tracing::warn!(path = %self.path.display(), error = %err, "discarding unreadable cache file");
                Ok(BTreeMap::new())
            }
        }
    }

    fn store(&self, map: &BTreeMap<String, String>) -> Result<()> {
        if map.is_empty() {
            return match std::fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(err) => Err(LoonaError::Storage(format!(
                    "Failed to remove cache {}: {}",
                    self.path.display(),
                    err
                ))),
            };
        }
        let json = serde_json::to_vec_pretty(map)?;
        write_private_atomic(&self.path, &json).map_err(|e| {
            LoonaError::Storage(format!(
                "Failed to write cache {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn modify(&self, f: impl FnOnce(&mut BTreeMap<String, String>) -> bool) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| LoonaError::Storage("File cache lock poisoned".to_string()))?;
        let mut map = self.load()?;
        if f(&mut map) {
            self.store(&map)?;
        }
        Ok(())
    }
}

impl LocalCache for FileCache {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.modify(|map| {
            map.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.modify(|map| map.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");

        FileCache::new(&path).set("k", "v").unwrap();

        let reopened = FileCache::new(&path);
        assert_eq!(reopened.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_removing_last_key_deletes_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");
        let cache = FileCache::new(&path);

        cache.set("a", "1").unwrap();
        cache.set("b", "2").unwrap();
        cache.remove("a").unwrap();
        assert!(path.exists());
        cache.remove("b").unwrap();
        assert!(!path.exists());
        cache.remove("b").unwrap();
    }

    #[test]
    fn test_corrupt_file_reads_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, b"[1, 2").unwrap();

        let cache = FileCache::new(&path);
        assert!(cache.get("k").unwrap().is_none());
        cache.set("k", "v").unwrap();
        assert_eq!(cache.get("k").unwrap().as_deref(), Some("v"));
    }
}

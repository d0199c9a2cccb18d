//! Durable key/value state storage.
//!
//! Backs the session and deferred-action singletons with a single JSON file
//! (`${BEATING_HOME}/state.json`) written with restricted permissions (0600).
//! The file survives restarts but not a cleared profile directory.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;

use crate::config::paths;

/// Handle to the durable key/value store.
///
/// Cheap to clone; every operation reads and rewrites the backing file, so
/// clones sharing one path observe each other's writes.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    /// Opens the store at the default state path.
    pub fn open_default() -> Self {
        Self::at(paths::state_path())
    }

    /// Opens the store at a specific path.
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the value stored under `key`, if any.
    ///
    /// # Errors
    /// Returns an error if the backing file cannot be read.
    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.load()?.remove(key))
    }

    /// Stores `value` under `key`, overwriting any previous value.
    ///
    /// # Errors
    /// Returns an error if the backing file cannot be written.
    pub fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value);
        self.save(&entries)
    }

    /// Removes and returns the value stored under `key`.
    ///
    /// The removal is persisted before this returns, so a second `remove`
    /// (or `get`) for the same key observes nothing.
    ///
    /// # Errors
    /// Returns an error if the backing file cannot be read or written.
    pub fn remove(&self, key: &str) -> Result<Option<Value>> {
        let mut entries = self.load()?;
        let removed = entries.remove(key);
        if removed.is_some() {
            self.save(&entries)?;
        }
        Ok(removed)
    }

    fn load(&self) -> Result<BTreeMap<String, Value>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read state from {}", self.path.display()))?;

        match serde_json::from_str(&contents) {
            Ok(entries) => Ok(entries),
            Err(err) => {
                // Fail open: an unreadable state file means "logged out,
                // nothing pending", not a crash. It is rewritten on the
                // next save.
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "state file is corrupt; treating it as empty"
                );
                Ok(BTreeMap::new())
            }
        }
    }

    fn save(&self, entries: &BTreeMap<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents =
            serde_json::to_string_pretty(entries).context("Failed to serialize state")?;

        // Write with restricted permissions
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&self.path)
                .with_context(|| format!("Failed to open {} for writing", self.path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        #[cfg(not(unix))]
        {
            fs::write(&self.path, contents)
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::json;
    use tempfile::tempdir;

    use super::*;

    fn temp_store(dir: &tempfile::TempDir) -> StateStore {
        StateStore::at(dir.path().join("state.json"))
    }

    /// Set then get returns the stored value.
    #[test]
    fn test_set_get_roundtrip() {
        let dir = tempdir().unwrap();
        let store = temp_store(&dir);

        store.set("auth.credential", json!("tok-123")).unwrap();
        assert_eq!(
            store.get("auth.credential").unwrap(),
            Some(json!("tok-123"))
        );
    }

    /// Get with no backing file returns None without creating the file.
    #[test]
    fn test_get_missing_file() {
        let dir = tempdir().unwrap();
        let store = temp_store(&dir);

        assert_eq!(store.get("auth.credential").unwrap(), None);
        assert!(!store.path().exists());
    }

    /// Remove persists the removal and returns the old value once.
    #[test]
    fn test_remove_is_destructive() {
        let dir = tempdir().unwrap();
        let store = temp_store(&dir);

        store.set("k", json!({"a": 1})).unwrap();
        assert_eq!(store.remove("k").unwrap(), Some(json!({"a": 1})));
        assert_eq!(store.remove("k").unwrap(), None);
        assert_eq!(store.get("k").unwrap(), None);
    }

    /// A corrupt state file reads as empty instead of erroring.
    #[test]
    fn test_corrupt_file_fails_open() {
        let dir = tempdir().unwrap();
        let store = temp_store(&dir);

        fs::write(store.path(), "{not json").unwrap();
        assert_eq!(store.get("auth.credential").unwrap(), None);
    }

    /// Clones over the same path observe each other's writes.
    #[test]
    fn test_clones_share_state() {
        let dir = tempdir().unwrap();
        let store = temp_store(&dir);
        let other = store.clone();

        store.set("k", json!("v")).unwrap();
        assert_eq!(other.get("k").unwrap(), Some(json!("v")));
    }

    /// The state file is written with 0600 permissions on Unix.
    #[cfg(unix)]
    #[test]
    fn test_state_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let store = temp_store(&dir);

        store.set("k", json!("v")).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}

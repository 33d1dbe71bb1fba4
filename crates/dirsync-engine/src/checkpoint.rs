//! Checkpoint of confirmed-synchronized remote ids.
//!
//! Lifecycle: loaded once at run start (missing or corrupt file degrades to
//! an empty set, which is always correct, just less efficient), mutated in
//! memory as actions succeed, persisted once at the end of the run or on a
//! shutdown request. Persisting writes to a temp file in the same directory
//! and renames it over the target, so a crash mid-write never leaves a
//! checkpoint inconsistent with what was actually applied remotely.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SyncError, SyncResult};
use crate::report::LoadWarning;

/// In-memory set of remote ids confirmed synchronized.
///
/// Owned exclusively by the engine for the duration of a run; only
/// confirmed-applied identities are ever inserted, never planned ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckpointSet(BTreeSet<String>);

impl CheckpointSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, remote_id: String) {
        self.0.insert(remote_id);
    }

    pub fn remove(&mut self, remote_id: &str) {
        self.0.remove(remote_id);
    }

    #[must_use]
    pub fn contains(&self, remote_id: &str) -> bool {
        self.0.contains(remote_id)
    }

    pub fn extend(&mut self, remote_ids: impl IntoIterator<Item = String>) {
        self.0.extend(remote_ids);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Durable storage for the checkpoint set, one JSON array of strings.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the checkpoint from disk.
    ///
    /// Never fatal: a missing file yields an empty set silently, an
    /// unreadable or unparsable one yields an empty set plus a warning for
    /// the error log.
    #[must_use]
    pub fn load(&self) -> (CheckpointSet, Option<LoadWarning>) {
        if !self.path.exists() {
            return (CheckpointSet::new(), None);
        }

        let degrade = |reason: String| {
            (
                CheckpointSet::new(),
                Some(LoadWarning::new(
                    "checkpoint-load",
                    None,
                    format!(
                        "{}: {reason}; starting from an empty checkpoint",
                        self.path.display()
                    ),
                )),
            )
        };

        let body = match fs::read_to_string(&self.path) {
            Ok(body) => body,
            Err(e) => return degrade(e.to_string()),
        };
        match serde_json::from_str::<CheckpointSet>(&body) {
            Ok(set) => {
                debug!(entries = set.len(), "loaded checkpoint from {}", self.path.display());
                (set, None)
            }
            Err(e) => degrade(e.to_string()),
        }
    }

    /// Persists the checkpoint atomically (write-to-temp-then-replace).
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::CheckpointPersist`]; the caller surfaces it as a
    /// fatal end-of-run error since losing the checkpoint risks redundant
    /// work next run.
    pub fn save(&self, set: &CheckpointSet) -> SyncResult<()> {
        let persist_err =
            |e: String| SyncError::CheckpointPersist(format!("{}: {e}", self.path.display()));

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| persist_err(e.to_string()))?;
            }
        }

        let body = serde_json::to_string_pretty(set).map_err(|e| persist_err(e.to_string()))?;

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, body).map_err(|e| persist_err(e.to_string()))?;
        fs::rename(&tmp, &self.path).map_err(|e| persist_err(e.to_string()))?;

        debug!(entries = set.len(), "persisted checkpoint to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_loads_empty_without_warning() {
        let dir = TempDir::new().unwrap();
        let store = CheckpointStore::new(dir.path().join("checkpoint.json"));

        let (set, warning) = store.load();
        assert!(set.is_empty());
        assert!(warning.is_none());
    }

    #[test]
    fn test_corrupt_file_degrades_to_empty_with_warning() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("checkpoint.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = CheckpointStore::new(&path);

        let (set, warning) = store.load();
        assert!(set.is_empty());
        let warning = warning.unwrap();
        assert_eq!(warning.context, "checkpoint-load");
        assert!(warning.message.contains("empty checkpoint"));
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = CheckpointStore::new(dir.path().join("checkpoint.json"));

        let mut set = CheckpointSet::new();
        set.insert("R1".to_string());
        set.insert("R2".to_string());
        store.save(&set).unwrap();

        let (loaded, warning) = store.load();
        assert!(warning.is_none());
        assert_eq!(loaded, set);
        assert!(loaded.contains("R1"));
    }

    #[test]
    fn test_save_creates_missing_parent_directory() {
        let dir = TempDir::new().unwrap();
        let store = CheckpointStore::new(dir.path().join("state/checkpoint.json"));

        store.save(&CheckpointSet::new()).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn test_save_replaces_previous_content() {
        let dir = TempDir::new().unwrap();
        let store = CheckpointStore::new(dir.path().join("checkpoint.json"));

        let mut first = CheckpointSet::new();
        first.insert("OLD".to_string());
        store.save(&first).unwrap();

        let mut second = CheckpointSet::new();
        second.insert("NEW".to_string());
        store.save(&second).unwrap();

        let (loaded, _) = store.load();
        assert!(loaded.contains("NEW"));
        assert!(!loaded.contains("OLD"));
        // No stray temp file left behind.
        assert!(!dir.path().join("checkpoint.tmp").exists());
    }

    #[test]
    fn test_file_format_is_a_json_array_of_strings() {
        let dir = TempDir::new().unwrap();
        let store = CheckpointStore::new(dir.path().join("checkpoint.json"));

        let mut set = CheckpointSet::new();
        set.insert("R1".to_string());
        store.save(&set).unwrap();

        let body = std::fs::read_to_string(store.path()).unwrap();
        let parsed: Vec<String> = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed, vec!["R1".to_string()]);
    }

    #[test]
    fn test_remove_after_delete() {
        let mut set = CheckpointSet::new();
        set.insert("R1".to_string());
        set.remove("R1");
        assert!(!set.contains("R1"));
    }
}

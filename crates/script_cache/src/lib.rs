//! Bounded, path-keyed storage for computed edit scripts.
//!
//! A caller stashes the script computed for a navigation under the page path and takes it back
//! on the next visit. The store is owned by whoever needs it; there is no process-wide
//! instance. Persistence is a JSON snapshot that keeps recency order.

use lru::LruCache;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use vdom::EditScript;

pub const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("script store capacity must be at least 1")]
    ZeroCapacity,
    #[error("invalid script store snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to access script store at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Serialize, Deserialize)]
struct Snapshot {
    capacity: usize,
    /// Least recently used first.
    entries: Vec<SnapshotEntry>,
}

#[derive(Serialize, Deserialize)]
struct SnapshotEntry {
    path: String,
    script: EditScript,
}

#[derive(Debug)]
pub struct ScriptStore {
    cache: LruCache<String, EditScript>,
}

impl Default for ScriptStore {
    fn default() -> Self {
        Self::new(NonZeroUsize::new(DEFAULT_CAPACITY).unwrap_or(NonZeroUsize::MIN))
    }
}

impl ScriptStore {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            cache: LruCache::new(capacity),
        }
    }

    pub fn with_capacity(capacity: usize) -> Result<Self, StoreError> {
        NonZeroUsize::new(capacity)
            .map(Self::new)
            .ok_or(StoreError::ZeroCapacity)
    }

    pub fn capacity(&self) -> usize {
        self.cache.cap().get()
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Stores `script` under `path` as the most recent entry. Returns the least recently used
    /// entry when it had to be evicted to make room.
    pub fn stash(
        &mut self,
        path: impl Into<String>,
        script: EditScript,
    ) -> Option<(String, EditScript)> {
        let path = path.into();
        let displaced = self.cache.push(path.clone(), script)?;
        if displaced.0 == path {
            return None;
        }
        log::debug!(target: "script_cache", "evicted script for {}", displaced.0);
        Some(displaced)
    }

    /// Removes and returns the script stored under `path`.
    pub fn take(&mut self, path: &str) -> Option<EditScript> {
        let script = self.cache.pop(path);
        log::trace!(target: "script_cache", "take {path}: {}", if script.is_some() { "hit" } else { "miss" });
        script
    }

    /// Looks up `path`, marking it most recently used.
    pub fn get(&mut self, path: &str) -> Option<&EditScript> {
        self.cache.get(path)
    }

    /// Looks up `path` without touching recency.
    pub fn peek(&self, path: &str) -> Option<&EditScript> {
        self.cache.peek(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.cache.contains(path)
    }

    /// Stored paths, most recently used first.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.cache.iter().map(|(path, _)| path.as_str())
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        let entries = self
            .cache
            .iter()
            .rev()
            .map(|(path, script)| SnapshotEntry {
                path: path.clone(),
                script: script.clone(),
            })
            .collect();
        let snapshot = Snapshot {
            capacity: self.capacity(),
            entries,
        };
        Ok(serde_json::to_string(&snapshot)?)
    }

    /// Rebuilds a store from [`ScriptStore::to_json`] output, recency order included.
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        let mut store = Self::with_capacity(snapshot.capacity)?;
        for entry in snapshot.entries {
            store.cache.push(entry.path, entry.script);
        }
        Ok(store)
    }

    /// Loads a snapshot file, or returns an empty store with `capacity` when the file does not
    /// exist yet.
    pub fn load_or_new(path: &Path, capacity: usize) -> Result<Self, StoreError> {
        match fs::read_to_string(path) {
            Ok(json) => Self::from_json(&json),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Self::with_capacity(capacity),
            Err(source) => Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        fs::write(path, self.to_json()?).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!(target: "script_cache", "saved {} scripts to {path:?}", self.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vdom::{DiffOp, Route};

    fn script(name: &str) -> EditScript {
        vec![DiffOp::AddAttribute {
            route: Route::root(),
            name: name.to_string(),
            value: String::new(),
        }]
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert!(matches!(
            ScriptStore::with_capacity(0),
            Err(StoreError::ZeroCapacity)
        ));
    }

    #[test]
    fn evicts_least_recently_used() {
        let mut store = ScriptStore::with_capacity(2).expect("store");
        assert!(store.stash("/a", script("a")).is_none());
        assert!(store.stash("/b", script("b")).is_none());
        // Touch /a so /b becomes the eviction candidate.
        assert!(store.get("/a").is_some());
        let evicted = store.stash("/c", script("c")).expect("eviction");
        assert_eq!(evicted.0, "/b");
        assert_eq!(store.paths().collect::<Vec<_>>(), ["/c", "/a"]);
    }

    #[test]
    fn peek_does_not_promote() {
        let mut store = ScriptStore::with_capacity(2).expect("store");
        store.stash("/a", script("a"));
        store.stash("/b", script("b"));
        assert!(store.peek("/a").is_some());
        let evicted = store.stash("/c", script("c")).expect("eviction");
        assert_eq!(evicted.0, "/a");
    }

    #[test]
    fn restash_replaces_without_eviction() {
        let mut store = ScriptStore::with_capacity(1).expect("store");
        store.stash("/a", script("a"));
        assert!(store.stash("/a", script("a2")).is_none());
        assert_eq!(store.len(), 1);
        assert_eq!(store.take("/a"), Some(script("a2")));
        assert_eq!(store.take("/a"), None);
        assert!(store.is_empty());
    }

    #[test]
    fn json_snapshot_keeps_entries_and_recency() {
        let mut store = ScriptStore::with_capacity(3).expect("store");
        store.stash("/a", script("a"));
        store.stash("/b", script("b"));
        store.stash("/c", script("c"));
        store.get("/a");
        let json = store.to_json().expect("snapshot");

        let mut restored = ScriptStore::from_json(&json).expect("restore");
        assert_eq!(restored.capacity(), 3);
        assert_eq!(restored.paths().collect::<Vec<_>>(), ["/a", "/c", "/b"]);
        assert_eq!(restored.peek("/c"), Some(&script("c")));
        let evicted = restored.stash("/d", script("d")).expect("eviction");
        assert_eq!(evicted.0, "/b");
    }

    #[test]
    fn snapshot_file_round_trips_and_missing_file_starts_empty() {
        let path = std::env::temp_dir().join(format!(
            "domdelta-script-store-{}.json",
            std::process::id()
        ));
        let _ = fs::remove_file(&path);

        let mut store = ScriptStore::load_or_new(&path, 2).expect("fresh store");
        assert!(store.is_empty());
        assert_eq!(store.capacity(), 2);
        store.stash("/a", script("a"));
        store.save(&path).expect("save");

        let mut restored = ScriptStore::load_or_new(&path, 8).expect("load");
        assert_eq!(restored.capacity(), 2);
        assert_eq!(restored.take("/a"), Some(script("a")));
        fs::remove_file(&path).expect("cleanup");
    }

    #[test]
    fn malformed_snapshot_is_an_error() {
        assert!(matches!(
            ScriptStore::from_json("{\"capacity\": 2}"),
            Err(StoreError::Json(_))
        ));
        assert!(matches!(
            ScriptStore::from_json("{\"capacity\": 0, \"entries\": []}"),
            Err(StoreError::ZeroCapacity)
        ));
    }
}

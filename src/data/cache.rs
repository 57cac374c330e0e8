//! Clean Table Cache
//! Memoizes normalized tables by source path and modification time.

use crate::data::CleanTable;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::debug;

/// Identifies one version of a source file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    path: PathBuf,
    modified: SystemTime,
}

impl CacheKey {
    pub fn new(path: impl Into<PathBuf>, modified: SystemTime) -> Self {
        Self {
            path: path.into(),
            modified,
        }
    }

    /// Key for the file currently on disk at `path`.
    pub fn for_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = std::fs::canonicalize(path)?;
        let modified = std::fs::metadata(&path)?.modified()?;
        Ok(Self { path, modified })
    }
}

/// Holds at most one clean table per source path.
///
/// A lookup with a different modification time is a miss, and inserting it
/// replaces the stale entry.
#[derive(Default)]
pub struct DatasetCache {
    entries: HashMap<PathBuf, (SystemTime, Arc<CleanTable>)>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<CleanTable>> {
        self.entries
            .get(&key.path)
            .filter(|(modified, _)| *modified == key.modified)
            .map(|(_, table)| Arc::clone(table))
    }

    pub fn insert(&mut self, key: CacheKey, table: CleanTable) -> Arc<CleanTable> {
        let table = Arc::new(table);
        self.entries
            .insert(key.path, (key.modified, Arc::clone(&table)));
        table
    }

    /// Return the cached table for `key`, or build and store it with `load`.
    pub fn get_or_insert_with<E>(
        &mut self,
        key: CacheKey,
        load: impl FnOnce() -> Result<CleanTable, E>,
    ) -> Result<Arc<CleanTable>, E> {
        if let Some(table) = self.get(&key) {
            debug!(path = %key.path.display(), "Clean table cache hit");
            return Ok(table);
        }

        debug!(path = %key.path.display(), "Clean table cache miss");
        Ok(self.insert(key, load()?))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

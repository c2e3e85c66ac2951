//! File listings of destination directories, keyed by directory name.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::CoreResult;
use crate::fs::entry::DirectoryEntry;
use crate::fs::gateway::FilesystemGateway;
use crate::fs::ops::{list_directory, resolve_path, sort_newest_first};

/// Maps destination directory names to their listing, newest file first.
///
/// A missing key means "not warmed yet or unknown", which is different from
/// a warmed directory that happens to be empty.
#[derive(Clone)]
pub struct DirectoryFileCache {
    destination_root: PathBuf,
    gateway: Arc<dyn FilesystemGateway>,
    entries: Arc<RwLock<HashMap<String, Vec<DirectoryEntry>>>>,
}

impl DirectoryFileCache {
    pub fn new(destination_root: PathBuf, gateway: Arc<dyn FilesystemGateway>) -> Self {
        Self {
            destination_root,
            gateway,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn destination_root(&self) -> &Path {
        &self.destination_root
    }

    /// Returns the cached listing, or `None` if `directory` was never warmed.
    pub fn get(&self, directory: &str) -> Option<Vec<DirectoryEntry>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(directory).cloned()
    }

    /// Re-lists `directory` and stores the sorted result.
    ///
    /// # Errors
    ///
    /// Returns the listing error from [`list_directory`]. The cached value for
    /// `directory` is left as it was.
    pub fn refresh(&self, directory: &str) -> CoreResult<()> {
        let dir = resolve_path(self.gateway.as_ref(), &self.destination_root, directory);
        let mut listing = list_directory(self.gateway.as_ref(), &dir)?;
        sort_newest_first(&mut listing);
        tracing::debug!("directory refreshed: {directory} ({} entries)", listing.len());

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(directory.to_string(), listing);
        Ok(())
    }

    pub fn contains(&self, directory: &str) -> bool {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.contains_key(directory)
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for DirectoryFileCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryFileCache")
            .field("destination_root", &self.destination_root)
            .field("len", &self.len())
            .finish()
    }
}

//! Text previews of inbound files, keyed by file name.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use crate::extract::TextExtractor;
use crate::fs::gateway::FilesystemGateway;
use crate::fs::ops::resolve_path;

/// Maps inbound file names to their extracted preview text.
///
/// Cloning is cheap and every clone shares the same map. Entries are never
/// evicted; a refresh overwrites the previous value for its key.
#[derive(Clone)]
pub struct PreviewCache {
    inbound_root: PathBuf,
    gateway: Arc<dyn FilesystemGateway>,
    extractor: Arc<dyn TextExtractor>,
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl PreviewCache {
    pub fn new(
        inbound_root: PathBuf,
        gateway: Arc<dyn FilesystemGateway>,
        extractor: Arc<dyn TextExtractor>,
    ) -> Self {
        Self {
            inbound_root,
            gateway,
            extractor,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn inbound_root(&self) -> &Path {
        &self.inbound_root
    }

    /// Returns the cached preview, or an empty string when `name` has not
    /// been warmed yet. Never touches the disk.
    pub fn get(&self, name: &str) -> String {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(name).cloned().unwrap_or_default()
    }

    /// Extracts the preview for `name` and stores it, replacing any older value.
    ///
    /// `name` is the listed display name; the file is read under its stored
    /// name. Extraction runs before the write lock is taken, so readers are
    /// only blocked for the insert itself.
    pub fn refresh(&self, name: &str) {
        let path = resolve_path(self.gateway.as_ref(), &self.inbound_root, name);
        let text = self.extractor.extract_preview(&path);
        tracing::debug!("preview refreshed: {name} ({} bytes)", text.len());
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(name.to_string(), text);
    }

    /// Drops the entry for `name`. Returns `true` if one was present.
    pub fn forget(&self, name: &str) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(name).is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.contains_key(name)
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

impl std::fmt::Debug for PreviewCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewCache")
            .field("inbound_root", &self.inbound_root)
            .field("len", &self.len())
            .finish()
    }
}

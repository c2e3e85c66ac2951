//! In-memory caches of inbound previews and destination listings.
//!
//! Both caches live for the whole process and are shared through a
//! [`CacheStore`] that the application creates once and hands to every
//! component that reads or refreshes them.

pub mod directory;
pub mod preview;

use std::path::PathBuf;
use std::sync::Arc;

pub use directory::DirectoryFileCache;
pub use preview::PreviewCache;

use crate::extract::TextExtractor;
use crate::fs::gateway::FilesystemGateway;

/// The two caches, bundled so they can be injected together.
#[derive(Debug, Clone)]
pub struct CacheStore {
    pub previews: PreviewCache,
    pub directories: DirectoryFileCache,
}

impl CacheStore {
    pub fn new(
        inbound_root: PathBuf,
        destination_root: PathBuf,
        gateway: Arc<dyn FilesystemGateway>,
        extractor: Arc<dyn TextExtractor>,
    ) -> Self {
        Self {
            previews: PreviewCache::new(inbound_root, Arc::clone(&gateway), extractor),
            directories: DirectoryFileCache::new(destination_root, gateway),
        }
    }
}

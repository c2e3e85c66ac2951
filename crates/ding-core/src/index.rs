//! The entry point front-ends talk to.
//!
//! [`DocIndex`] wires one [`CacheStore`] into a [`WarmupScheduler`] and a
//! [`MoveEngine`] and exposes the listing, inspection and move operations.
//! Listings always come from the filesystem and warm the caches as a side
//! effect; inspections only ever read the caches.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::runtime::Handle;

use crate::cache::CacheStore;
use crate::config::settings::Config;
use crate::error::CoreResult;
use crate::extract::TextExtractor;
use crate::fs::entry::DirectoryEntry;
use crate::fs::gateway::FilesystemGateway;
use crate::fs::ops::{count_files, list_directory, resolve_path, sort_by_name};
use crate::mover::{MoveEngine, MoveOutcome};
use crate::naming;
use crate::ocr::OcrProcessor;
use crate::warmup::{WarmupBatch, WarmupScheduler};

/// A directory listing together with the cache warmup it started.
#[derive(Debug)]
pub struct Listing {
    /// Entries sorted by name.
    pub entries: Vec<DirectoryEntry>,
    /// Background part of the warmup; the first entry is already cached.
    pub warmup: WarmupBatch,
}

/// Inbound and destination index with its caches.
#[derive(Clone)]
pub struct DocIndex {
    caches: CacheStore,
    scheduler: WarmupScheduler,
    mover: MoveEngine,
    gateway: Arc<dyn FilesystemGateway>,
    inbound_root: PathBuf,
    destination_root: PathBuf,
}

impl DocIndex {
    /// Builds an index over the roots in `config`, with empty caches.
    ///
    /// Background work is spawned onto `runtime`.
    pub fn new(
        config: &Config,
        gateway: Arc<dyn FilesystemGateway>,
        extractor: Arc<dyn TextExtractor>,
        runtime: Handle,
    ) -> Self {
        let inbound_root = config.paths.inbound_root();
        let destination_root = config.paths.destination_root();
        let caches = CacheStore::new(
            inbound_root.clone(),
            destination_root.clone(),
            Arc::clone(&gateway),
            extractor,
        );
        let scheduler = WarmupScheduler::new(caches.clone(), runtime, config.warmup.workers);
        let mover = MoveEngine::new(
            Arc::clone(&gateway),
            scheduler.clone(),
            inbound_root.clone(),
            destination_root.clone(),
        );
        Self {
            caches,
            scheduler,
            mover,
            gateway,
            inbound_root,
            destination_root,
        }
    }

    pub fn inbound_root(&self) -> &Path {
        &self.inbound_root
    }

    pub fn destination_root(&self) -> &Path {
        &self.destination_root
    }

    pub fn caches(&self) -> &CacheStore {
        &self.caches
    }

    /// On-disk path of the inbound file listed as `name`.
    pub fn inbound_path(&self, name: &str) -> PathBuf {
        resolve_path(self.gateway.as_ref(), &self.inbound_root, name)
    }

    /// Lists the inbound root and warms the previews of its files.
    ///
    /// # Errors
    ///
    /// Fails if the inbound root cannot be listed.
    pub fn list_inbound(&self) -> CoreResult<Listing> {
        let mut entries = list_directory(self.gateway.as_ref(), &self.inbound_root)?;
        sort_by_name(&mut entries);

        let names: Vec<String> = entries
            .iter()
            .filter(|e| !e.is_dir())
            .map(|e| e.name().to_string())
            .collect();
        let warmup = self.scheduler.warm_previews(&names);
        Ok(Listing { entries, warmup })
    }

    /// Lists the files of the inbound root by name without warming anything.
    ///
    /// # Errors
    ///
    /// Fails if the inbound root cannot be listed.
    pub fn inbound_files(&self) -> CoreResult<Vec<DirectoryEntry>> {
        let mut entries = list_directory(self.gateway.as_ref(), &self.inbound_root)?;
        entries.retain(|e| !e.is_dir());
        sort_by_name(&mut entries);
        Ok(entries)
    }

    /// Lists the subdirectories of the destination root and warms their
    /// file listings.
    ///
    /// # Errors
    ///
    /// Fails if the destination root cannot be listed.
    pub fn list_destination_directories(&self) -> CoreResult<Listing> {
        let mut entries: Vec<DirectoryEntry> =
            list_directory(self.gateway.as_ref(), &self.destination_root)?
                .into_iter()
                .filter(DirectoryEntry::is_dir)
                .collect();
        sort_by_name(&mut entries);

        let names: Vec<String> = entries.iter().map(|e| e.name().to_string()).collect();
        let warmup = self.scheduler.warm_directories(&names);
        Ok(Listing { entries, warmup })
    }

    /// Cached preview of an inbound file, empty while not yet warmed.
    pub fn get_preview(&self, name: &str) -> String {
        self.caches.previews.get(name)
    }

    /// Schedules a background refresh of one inbound preview, leaving the
    /// rest of the cache alone.
    pub fn refresh_preview(&self, name: &str) -> WarmupBatch {
        self.scheduler.refresh_preview(name)
    }

    /// Cached listing of a destination directory, `None` while not yet warmed.
    pub fn get_directory_listing(&self, directory: &str) -> Option<Vec<DirectoryEntry>> {
        self.caches.directories.get(directory)
    }

    /// Moves an inbound file into a destination directory.
    ///
    /// On success the moved file's preview is dropped from the cache.
    ///
    /// # Errors
    ///
    /// See [`MoveEngine::move_file`].
    pub fn move_file(
        &self,
        source_name: &str,
        requested_name: &str,
        destination_dir: &str,
    ) -> CoreResult<MoveOutcome> {
        let outcome = self.mover.move_file(source_name, requested_name, destination_dir)?;
        self.caches.previews.forget(source_name);
        Ok(outcome)
    }

    /// Number of files (not subdirectories) in a destination directory, read
    /// from disk. Unreadable directories count as zero.
    pub fn count_files(&self, directory: &str) -> usize {
        let dir = resolve_path(self.gateway.as_ref(), &self.destination_root, directory);
        count_files(self.gateway.as_ref(), &dir)
    }

    /// Name suggestions from the cached listing of `directory`.
    pub fn suggest_names(
        &self,
        directory: &str,
        prefix: &str,
        extensions: &[&str],
    ) -> Vec<String> {
        match self.caches.directories.get(directory) {
            Some(entries) => naming::suggest_names(&entries, prefix, extensions),
            None => Vec::new(),
        }
    }

    /// Runs OCR on one inbound file and schedules a refresh of its preview.
    ///
    /// # Errors
    ///
    /// Whatever `processor` reports; the preview is left untouched then.
    pub fn ocr_one(&self, name: &str, processor: &dyn OcrProcessor) -> CoreResult<WarmupBatch> {
        naming::validate_name(name)?;
        processor.process(&self.inbound_path(name))?;
        tracing::debug!("ocr done: {name}");
        Ok(self.scheduler.refresh_preview(name))
    }
}

impl std::fmt::Debug for DocIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocIndex")
            .field("inbound_root", &self.inbound_root)
            .field("destination_root", &self.destination_root)
            .field("caches", &self.caches)
            .finish()
    }
}

//! Background population of the preview and directory caches.
//!
//! A warm call refreshes its first key on the calling thread, so the first
//! screen a user sees already has data, and hands every other key to the
//! tokio blocking pool. At most `workers` refreshes run at once. Each call
//! returns a [`WarmupBatch`] that can be awaited to know when the batch is
//! done, or simply dropped to let it finish on its own.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::cache::CacheStore;

/// Completion handle for the background part of one warm call.
///
/// Dropping the batch detaches its tasks; they still run to completion.
#[derive(Debug, Default)]
#[must_use = "drop the batch to detach it, or await `wait` to block on it"]
pub struct WarmupBatch {
    tasks: Vec<JoinHandle<()>>,
}

impl WarmupBatch {
    /// Number of background tasks in this batch.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Resolves once every task of the batch has finished.
    pub async fn wait(self) {
        for task in self.tasks {
            if let Err(e) = task.await {
                tracing::warn!("warmup task did not complete: {e}");
            }
        }
    }

    fn push(&mut self, task: JoinHandle<()>) {
        self.tasks.push(task);
    }

    /// Folds `other` into this batch.
    pub fn merge(&mut self, other: WarmupBatch) {
        self.tasks.extend(other.tasks);
    }
}

/// Refreshes cache entries on a bounded pool of blocking workers.
#[derive(Debug, Clone)]
pub struct WarmupScheduler {
    caches: CacheStore,
    runtime: Handle,
    permits: Arc<Semaphore>,
}

impl WarmupScheduler {
    /// Creates a scheduler that spawns onto `runtime` and runs at most
    /// `workers` refreshes concurrently. A worker count of zero is treated
    /// as one.
    pub fn new(caches: CacheStore, runtime: Handle, workers: usize) -> Self {
        Self {
            caches,
            runtime,
            permits: Arc::new(Semaphore::new(workers.max(1))),
        }
    }

    pub fn caches(&self) -> &CacheStore {
        &self.caches
    }

    /// Warms the preview cache for `names`.
    pub fn warm_previews(&self, names: &[String]) -> WarmupBatch {
        let previews = self.caches.previews.clone();
        self.warm_all(names, move |name| previews.refresh(name))
    }

    /// Warms the directory cache for `directories`.
    ///
    /// A directory that cannot be listed keeps its previous cache entry.
    pub fn warm_directories(&self, directories: &[String]) -> WarmupBatch {
        let cache = self.caches.directories.clone();
        self.warm_all(directories, move |dir| {
            if let Err(e) = cache.refresh(dir) {
                tracing::warn!("directory warmup skipped {dir}: {e}");
            }
        })
    }

    /// Schedules a background refresh of one preview.
    pub fn refresh_preview(&self, name: &str) -> WarmupBatch {
        let previews = self.caches.previews.clone();
        let mut batch = WarmupBatch::default();
        batch.push(self.spawn(name.to_string(), move |name| previews.refresh(name)));
        batch
    }

    /// Schedules a background refresh of one directory listing.
    pub fn refresh_directory(&self, directory: &str) -> WarmupBatch {
        let cache = self.caches.directories.clone();
        let mut batch = WarmupBatch::default();
        batch.push(self.spawn(directory.to_string(), move |dir| {
            if let Err(e) = cache.refresh(dir) {
                tracing::warn!("directory refresh skipped {dir}: {e}");
            }
        }));
        batch
    }

    fn warm_all<F>(&self, keys: &[String], refresh: F) -> WarmupBatch
    where
        F: Fn(&str) + Clone + Send + 'static,
    {
        let mut batch = WarmupBatch::default();
        let Some((first, rest)) = keys.split_first() else {
            return batch;
        };

        refresh(first.as_str());
        for key in rest {
            batch.push(self.spawn(key.clone(), refresh.clone()));
        }
        tracing::debug!("warmup: 1 synchronous, {} scheduled", batch.len());
        batch
    }

    fn spawn<F>(&self, key: String, refresh: F) -> JoinHandle<()>
    where
        F: Fn(&str) + Send + 'static,
    {
        let permits = Arc::clone(&self.permits);
        let runtime = self.runtime.clone();
        self.runtime.spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                return;
            };
            let outcome = runtime.spawn_blocking(move || refresh(key.as_str())).await;
            if let Err(e) = outcome {
                tracing::warn!("warmup worker failed: {e}");
            }
        })
    }
}

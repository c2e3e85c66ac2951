//! Moving an inbound document into a destination directory.
//!
//! A move is a copy followed by a delete, never a rename, so it works
//! across volumes. Both the destination directory and the inbound root are
//! probed with a sentinel file before any data is read. The original is
//! deleted only after the new copy has been written; if that delete fails
//! the document exists twice and the caller gets
//! [`CoreError::PartialMove`]. The copy never replaces an existing file.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{CoreError, CoreResult};
use crate::fs::gateway::FilesystemGateway;
use crate::fs::ops::{probe_writable, resolve_path, same_location};
use crate::naming::{reconcile_extension, validate_name};
use crate::warmup::{WarmupBatch, WarmupScheduler};

/// Result of a completed move.
#[derive(Debug)]
pub struct MoveOutcome {
    /// Name the file was written under, extension included.
    pub final_name: String,
    /// The background refresh of the destination listing.
    pub refresh: WarmupBatch,
}

/// Performs moves and keeps the destination listing cache in step.
#[derive(Clone)]
pub struct MoveEngine {
    gateway: Arc<dyn FilesystemGateway>,
    scheduler: WarmupScheduler,
    inbound_root: PathBuf,
    destination_root: PathBuf,
}

impl MoveEngine {
    pub fn new(
        gateway: Arc<dyn FilesystemGateway>,
        scheduler: WarmupScheduler,
        inbound_root: PathBuf,
        destination_root: PathBuf,
    ) -> Self {
        Self {
            gateway,
            scheduler,
            inbound_root,
            destination_root,
        }
    }

    /// Moves `source_name` from the inbound root into `destination_dir`,
    /// naming it `requested_name` plus the source extension if missing.
    ///
    /// Runs to completion on the calling thread. Only the refresh of the
    /// destination listing happens in the background.
    ///
    /// # Errors
    ///
    /// - [`CoreError::InvalidName`] if any of the names is not a plain file name.
    /// - [`CoreError::PermissionCheck`] if either directory rejects the sentinel.
    /// - [`CoreError::SourceRead`] if the original cannot be read.
    /// - [`CoreError::DestinationWrite`] if the copy cannot be written, a file
    ///   with the final name already exists, or the destination is the
    ///   source itself.
    /// - [`CoreError::PartialMove`] if the copy was written but the original
    ///   could not be removed.
    pub fn move_file(
        &self,
        source_name: &str,
        requested_name: &str,
        destination_dir: &str,
    ) -> CoreResult<MoveOutcome> {
        validate_name(source_name)?;
        validate_name(requested_name)?;
        validate_name(destination_dir)?;

        let gateway = self.gateway.as_ref();
        let target_dir = resolve_path(gateway, &self.destination_root, destination_dir);
        probe_writable(gateway, &target_dir)?;
        probe_writable(gateway, &self.inbound_root)?;

        let final_name = reconcile_extension(source_name, requested_name);
        let source = resolve_path(gateway, &self.inbound_root, source_name);
        let destination = target_dir.join(&final_name);
        if same_location(&source, &destination) {
            return Err(CoreError::DestinationWrite {
                path: destination,
                source: io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    "destination is the source file",
                ),
            });
        }

        self.transfer(&source, &destination)?;

        tracing::info!("moved {} to {}", source.display(), destination.display());
        let refresh = self.scheduler.refresh_directory(destination_dir);
        Ok(MoveOutcome {
            final_name,
            refresh,
        })
    }

    fn transfer(&self, source: &Path, destination: &Path) -> CoreResult<()> {
        let contents = self
            .gateway
            .read_file(source)
            .map_err(|e| CoreError::SourceRead {
                path: source.to_path_buf(),
                source: e,
            })?;

        self.gateway
            .write_file(destination, &contents)
            .map_err(|e| CoreError::DestinationWrite {
                path: destination.to_path_buf(),
                source: e,
            })?;

        if let Err(e) = self.gateway.remove_file(source) {
            tracing::error!(
                "{} copied to {} but the original could not be removed: {e}",
                source.display(),
                destination.display()
            );
            return Err(CoreError::PartialMove {
                source_path: source.to_path_buf(),
                destination: destination.to_path_buf(),
                source: e,
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for MoveEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MoveEngine")
            .field("inbound_root", &self.inbound_root)
            .field("destination_root", &self.destination_root)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStore;
    use crate::extract::TextExtractor;
    use crate::fs::entry::DirectoryEntry;
    use crate::fs::gateway::LocalFs;
    use crate::fs::ops::SENTINEL_PREFIX;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;
    use tokio::runtime::Handle;

    struct FixedExtractor;

    impl TextExtractor for FixedExtractor {
        fn extract_preview(&self, _path: &Path) -> String {
            "text".to_string()
        }
    }

    /// Wraps [`LocalFs`], failing chosen operations and recording the
    /// paths touched by writes.
    #[derive(Default)]
    struct FaultyFs {
        deny_write_under: Option<PathBuf>,
        fail_read: bool,
        fail_remove_of: Option<PathBuf>,
        writes: Mutex<Vec<PathBuf>>,
    }

    impl FilesystemGateway for FaultyFs {
        fn list_directory(&self, dir: &Path) -> io::Result<Vec<DirectoryEntry>> {
            LocalFs.list_directory(dir)
        }

        fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
            if self.fail_read {
                return Err(io::Error::other("input/output error"));
            }
            LocalFs.read_file(path)
        }

        fn write_file(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
            self.writes.lock().unwrap().push(path.to_path_buf());
            if let Some(dir) = &self.deny_write_under {
                if path.starts_with(dir) {
                    return Err(io::Error::new(
                        io::ErrorKind::PermissionDenied,
                        "read-only file system",
                    ));
                }
            }
            LocalFs.write_file(path, contents)
        }

        fn remove_file(&self, path: &Path) -> io::Result<()> {
            if self.fail_remove_of.as_deref() == Some(path) {
                return Err(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    "device busy",
                ));
            }
            LocalFs.remove_file(path)
        }
    }

    struct Fixture {
        _tmp: TempDir,
        inbound: PathBuf,
        destination: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let tmp = TempDir::new().unwrap();
            let inbound = tmp.path().join("inbox");
            let destination = tmp.path().join("docs");
            Self::with_roots(tmp, inbound, destination)
        }

        /// The inbound root is itself a destination directory, `docs/inbox`.
        fn nested() -> Self {
            let tmp = TempDir::new().unwrap();
            let destination = tmp.path().join("docs");
            let inbound = destination.join("inbox");
            Self::with_roots(tmp, inbound, destination)
        }

        fn with_roots(tmp: TempDir, inbound: PathBuf, destination: PathBuf) -> Self {
            fs::create_dir_all(&inbound).unwrap();
            fs::create_dir_all(destination.join("taxes")).unwrap();
            fs::write(inbound.join("scan.pdf"), b"%PDF-1.4 invoice").unwrap();
            Self {
                _tmp: tmp,
                inbound,
                destination,
            }
        }

        fn engine(&self, gateway: Arc<dyn FilesystemGateway>) -> MoveEngine {
            let caches = CacheStore::new(
                self.inbound.clone(),
                self.destination.clone(),
                Arc::clone(&gateway),
                Arc::new(FixedExtractor),
            );
            let scheduler = WarmupScheduler::new(caches, Handle::current(), 2);
            MoveEngine::new(
                gateway,
                scheduler,
                self.inbound.clone(),
                self.destination.clone(),
            )
        }

        fn taxes(&self) -> PathBuf {
            self.destination.join("taxes")
        }
    }

    fn file_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn move_round_trip() {
        let fx = Fixture::new();
        let engine = fx.engine(Arc::new(LocalFs));

        let outcome = engine.move_file("scan.pdf", "invoice", "taxes").unwrap();

        assert_eq!(outcome.final_name, "invoice.pdf");
        assert!(!fx.inbound.join("scan.pdf").exists());
        assert_eq!(
            fs::read(fx.taxes().join("invoice.pdf")).unwrap(),
            b"%PDF-1.4 invoice"
        );
        assert_eq!(file_names(&fx.taxes()), vec!["invoice.pdf"]);
        assert!(file_names(&fx.inbound).is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn binary_content_survives_move() {
        let fx = Fixture::new();
        let bytes: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
        fs::write(fx.inbound.join("raw.pdf"), &bytes).unwrap();
        let engine = fx.engine(Arc::new(LocalFs));

        let outcome = engine.move_file("raw.pdf", "raw-copy.pdf", "taxes").unwrap();

        assert_eq!(outcome.final_name, "raw-copy.pdf");
        assert_eq!(fs::read(fx.taxes().join("raw-copy.pdf")).unwrap(), bytes);
        assert!(!fx.inbound.join("raw.pdf").exists());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn existing_extension_is_not_doubled() {
        let fx = Fixture::new();
        let engine = fx.engine(Arc::new(LocalFs));

        let outcome = engine.move_file("scan.pdf", "Invoice.PDF", "taxes").unwrap();

        assert_eq!(outcome.final_name, "Invoice.PDF");
        assert!(fx.taxes().join("Invoice.PDF").exists());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn appended_extension_keeps_source_case() {
        let fx = Fixture::new();
        fs::write(fx.inbound.join("photo.JPG"), b"jpeg").unwrap();
        let engine = fx.engine(Arc::new(LocalFs));

        let outcome = engine.move_file("photo.JPG", "receipt", "taxes").unwrap();

        assert_eq!(outcome.final_name, "receipt.JPG");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn refresh_shows_moved_file() {
        let fx = Fixture::new();
        let engine = fx.engine(Arc::new(LocalFs));

        let outcome = engine.move_file("scan.pdf", "invoice", "taxes").unwrap();
        outcome.refresh.wait().await;

        let listing = engine.scheduler.caches().directories.get("taxes").unwrap();
        let names: Vec<&str> = listing.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["invoice.pdf"]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unwritable_destination_aborts_before_reading() {
        let fx = Fixture::new();
        let gateway = Arc::new(FaultyFs {
            deny_write_under: Some(fx.taxes()),
            fail_read: true,
            ..Default::default()
        });
        let engine = fx.engine(gateway.clone());

        let err = engine.move_file("scan.pdf", "invoice", "taxes").unwrap_err();

        assert!(matches!(err, CoreError::PermissionCheck { ref dir, .. } if *dir == fx.taxes()));
        assert!(fx.inbound.join("scan.pdf").exists());
        let writes = gateway.writes.lock().unwrap();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].parent(), Some(fx.taxes().as_path()));
        let sentinel = writes[0].file_name().unwrap().to_string_lossy();
        assert!(sentinel.starts_with(SENTINEL_PREFIX));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unwritable_inbound_aborts_with_no_side_effects() {
        let fx = Fixture::new();
        let gateway = Arc::new(FaultyFs {
            deny_write_under: Some(fx.inbound.clone()),
            ..Default::default()
        });
        let engine = fx.engine(gateway);

        let err = engine.move_file("scan.pdf", "invoice", "taxes").unwrap_err();

        assert!(matches!(err, CoreError::PermissionCheck { ref dir, .. } if *dir == fx.inbound));
        assert!(fx.inbound.join("scan.pdf").exists());
        assert!(file_names(&fx.taxes()).is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn missing_destination_directory_fails_preflight() {
        let fx = Fixture::new();
        let engine = fx.engine(Arc::new(LocalFs));

        let err = engine.move_file("scan.pdf", "invoice", "unplugged").unwrap_err();

        assert!(matches!(err, CoreError::PermissionCheck { .. }));
        assert!(fx.inbound.join("scan.pdf").exists());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unreadable_source_writes_nothing() {
        let fx = Fixture::new();
        let gateway = Arc::new(FaultyFs {
            fail_read: true,
            ..Default::default()
        });
        let engine = fx.engine(gateway);

        let err = engine.move_file("scan.pdf", "invoice", "taxes").unwrap_err();

        assert!(matches!(err, CoreError::SourceRead { .. }));
        assert!(fx.inbound.join("scan.pdf").exists());
        assert!(!fx.taxes().join("invoice.pdf").exists());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn missing_source_is_a_source_read_error() {
        let fx = Fixture::new();
        let engine = fx.engine(Arc::new(LocalFs));

        let err = engine.move_file("nope.pdf", "invoice", "taxes").unwrap_err();

        assert!(matches!(err, CoreError::SourceRead { .. }));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn failed_remove_reports_partial_move() {
        let fx = Fixture::new();
        let gateway = Arc::new(FaultyFs {
            fail_remove_of: Some(fx.inbound.join("scan.pdf")),
            ..Default::default()
        });
        let engine = fx.engine(gateway);

        let err = engine.move_file("scan.pdf", "invoice", "taxes").unwrap_err();

        assert!(err.is_partial_move());
        assert!(err.to_string().contains("manually"));
        assert!(fx.inbound.join("scan.pdf").exists());
        assert_eq!(
            fs::read(fx.taxes().join("invoice.pdf")).unwrap(),
            b"%PDF-1.4 invoice"
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn path_like_names_are_rejected() {
        let fx = Fixture::new();
        let engine = fx.engine(Arc::new(LocalFs));

        for (source, requested, dir) in [
            ("scan.pdf", "../escape", "taxes"),
            ("../scan.pdf", "invoice", "taxes"),
            ("scan.pdf", "invoice", ".."),
            ("scan.pdf", "", "taxes"),
        ] {
            let err = engine.move_file(source, requested, dir).unwrap_err();
            assert!(matches!(err, CoreError::InvalidName(_)), "{source} {requested} {dir}");
        }
        assert!(fx.inbound.join("scan.pdf").exists());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn moving_onto_itself_keeps_the_document() {
        let fx = Fixture::nested();
        let engine = fx.engine(Arc::new(LocalFs));

        let err = engine.move_file("scan.pdf", "scan", "inbox").unwrap_err();

        assert!(matches!(err, CoreError::DestinationWrite { .. }));
        assert_eq!(
            fs::read(fx.inbound.join("scan.pdf")).unwrap(),
            b"%PDF-1.4 invoice"
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn nested_inbound_moves_under_a_new_name() {
        let fx = Fixture::nested();
        let engine = fx.engine(Arc::new(LocalFs));

        let outcome = engine.move_file("scan.pdf", "invoice", "inbox").unwrap();

        assert_eq!(outcome.final_name, "invoice.pdf");
        assert_eq!(file_names(&fx.inbound), vec!["invoice.pdf"]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn existing_archive_file_is_not_replaced() {
        let fx = Fixture::new();
        fs::write(fx.taxes().join("invoice.pdf"), "archived original").unwrap();
        let engine = fx.engine(Arc::new(LocalFs));

        let err = engine.move_file("scan.pdf", "invoice", "taxes").unwrap_err();

        match err {
            CoreError::DestinationWrite { ref source, .. } => {
                assert_eq!(source.kind(), io::ErrorKind::AlreadyExists);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(
            fs::read_to_string(fx.taxes().join("invoice.pdf")).unwrap(),
            "archived original"
        );
        assert!(fx.inbound.join("scan.pdf").exists());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn decomposed_source_name_is_moved() {
        let fx = Fixture::new();
        let decomposed = "re\u{301}sume\u{301}.pdf";
        fs::write(fx.inbound.join(decomposed), b"cv").unwrap();
        let engine = fx.engine(Arc::new(LocalFs));

        let outcome = engine
            .move_file("r\u{e9}sum\u{e9}.pdf", "cv", "taxes")
            .unwrap();

        assert_eq!(outcome.final_name, "cv.pdf");
        assert_eq!(fs::read(fx.taxes().join("cv.pdf")).unwrap(), b"cv");
        assert!(!fx.inbound.join(decomposed).exists());
    }
}

//! Directory listing, ordering and write probing.

use std::cmp::Ordering;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{self, AtomicU64};

use unicode_normalization::UnicodeNormalization;

use crate::error::{CoreError, CoreResult};
use crate::fs::entry::DirectoryEntry;
use crate::fs::gateway::FilesystemGateway;

/// Prefix of the probe files created and removed by [`probe_writable`].
pub const SENTINEL_PREFIX: &str = "docin.";

/// Suffix of the probe files created and removed by [`probe_writable`].
pub const SENTINEL_SUFFIX: &str = ".test";

const SENTINEL_CONTENT: &[u8] = b"write test";

static SENTINEL_SEQ: AtomicU64 = AtomicU64::new(0);

/// Returns a probe file name no other probe of this process uses,
/// e.g. `docin.4242-0.test`.
fn sentinel_name() -> String {
    let seq = SENTINEL_SEQ.fetch_add(1, atomic::Ordering::Relaxed);
    format!(
        "{SENTINEL_PREFIX}{}-{seq}{SENTINEL_SUFFIX}",
        std::process::id()
    )
}

/// Lists `dir` through `gateway`, returning entries **unsorted**.
///
/// # Errors
///
/// - [`CoreError::NotFound`] if the directory does not exist.
/// - [`CoreError::PermissionDenied`] if read access is denied.
/// - [`CoreError::FilesystemRead`] for any other listing failure.
pub fn list_directory(
    gateway: &dyn FilesystemGateway,
    dir: &Path,
) -> CoreResult<Vec<DirectoryEntry>> {
    gateway
        .list_directory(dir)
        .map_err(|e| CoreError::from_listing(dir.to_path_buf(), e))
}

/// Sorts entries most recently modified first.
///
/// Equal modification times fall back to name ascending, and entries without
/// a modification time go last, so the order never depends on what the
/// filesystem returned.
pub fn sort_newest_first(entries: &mut [DirectoryEntry]) {
    entries.sort_by(|a, b| {
        let by_time = match (a.modified(), b.modified()) {
            (Some(ta), Some(tb)) => tb.cmp(&ta),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_time.then_with(|| a.name().cmp(b.name()))
    });
}

/// Sorts entries by name, byte-wise ascending.
pub fn sort_by_name(entries: &mut [DirectoryEntry]) {
    entries.sort_by(|a, b| a.name().cmp(b.name()));
}

/// Verifies that `dir` accepts new files by writing and removing a sentinel.
///
/// The sentinel gets a fresh name on every call and is created with
/// [`FilesystemGateway::write_file`], so an existing user file is never
/// touched. A failure to remove the sentinel afterwards is ignored; the
/// write already proved the directory is writable.
///
/// # Errors
///
/// [`CoreError::PermissionCheck`] when the sentinel cannot be written.
pub fn probe_writable(gateway: &dyn FilesystemGateway, dir: &Path) -> CoreResult<()> {
    let sentinel = dir.join(sentinel_name());
    gateway
        .write_file(&sentinel, SENTINEL_CONTENT)
        .map_err(|source| CoreError::PermissionCheck {
            dir: dir.to_path_buf(),
            source,
        })?;
    if let Err(e) = gateway.remove_file(&sentinel) {
        tracing::warn!("could not remove sentinel {}: {e}", sentinel.display());
    }
    Ok(())
}

/// Returns the on-disk path of the entry of `dir` listed as `name`.
///
/// Listed names are NFC-normalised and lossily decoded, so the stored name
/// can differ from the display name. A stored name equal to `name` wins.
/// When nothing matches, or `dir` cannot be listed, the plain join is
/// returned and the caller's own access reports the failure.
pub fn resolve_path(gateway: &dyn FilesystemGateway, dir: &Path, name: &str) -> PathBuf {
    let direct = dir.join(name);
    // An ASCII display name can only come from the identical stored name.
    if name.is_ascii() {
        return direct;
    }
    let Ok(entries) = gateway.list_directory(dir) else {
        return direct;
    };

    let wanted: String = name.nfc().collect();
    let mut normalised = None;
    for entry in entries {
        if entry.file_name() == OsStr::new(name) {
            return direct;
        }
        if normalised.is_none() && entry.name() == wanted {
            normalised = Some(dir.join(entry.file_name()));
        }
    }
    normalised.unwrap_or(direct)
}

/// Returns `true` if `a` and `b` name the same file, either literally or
/// after resolving links and relative components.
pub fn same_location(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Counts the non-directory entries of `dir`. Unreadable directories count as `0`.
pub fn count_files(gateway: &dyn FilesystemGateway, dir: &Path) -> usize {
    match gateway.list_directory(dir) {
        Ok(entries) => entries.iter().filter(|e| !e.is_dir()).count(),
        Err(_) => 0,
    }
}

//! Directory entry representation.

use std::ffi::{OsStr, OsString};
use std::time::SystemTime;

use unicode_normalization::UnicodeNormalization;

/// A snapshot of one entry in an inbound or destination directory.
///
/// `DirectoryEntry` is immutable and only describes the directory at the
/// moment it was listed. Directory sizes are reported as `0`.
///
/// [`name`](Self::name) is the normalised display name used as a cache key;
/// [`file_name`](Self::file_name) is the name as stored on disk and is what
/// any later disk access must use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    file_name: OsString,
    name: String,
    size: u64,
    modified: Option<SystemTime>,
    is_dir: bool,
}

impl DirectoryEntry {
    /// Creates an entry from the on-disk file name and its metadata.
    ///
    /// The display name is re-composed to NFC so decomposed names (as stored
    /// by macOS) compare equal to what the user types. Bytes that are not
    /// valid UTF-8 show up as U+FFFD in the display name only.
    pub fn new(file_name: OsString, metadata: &std::fs::Metadata) -> Self {
        let name = file_name.to_string_lossy().nfc().collect();
        Self {
            file_name,
            name,
            size: if metadata.is_dir() { 0 } else { metadata.len() },
            modified: metadata.modified().ok(),
            is_dir: metadata.is_dir(),
        }
    }

    /// Creates an entry without touching the filesystem.
    pub fn from_parts(name: &str, size: u64, modified: Option<SystemTime>, is_dir: bool) -> Self {
        Self {
            file_name: OsString::from(name),
            name: name.nfc().collect(),
            size: if is_dir { 0 } else { size },
            modified,
            is_dir,
        }
    }

    /// Returns the NFC display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the name exactly as stored on disk.
    pub fn file_name(&self) -> &OsStr {
        &self.file_name
    }

    /// Returns the size in bytes. Always `0` for directories.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Returns the last-modified time, if the platform reported one.
    pub fn modified(&self) -> Option<SystemTime> {
        self.modified
    }

    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    /// Returns `true` if the name starts with `.`.
    pub fn is_hidden(&self) -> bool {
        self.name.starts_with('.')
    }
}

//! Filesystem access used by the caches and the move engine.
//!
//! Everything that reads or mutates the disk goes through
//! [`FilesystemGateway`], so tests can substitute a gateway that fails at a
//! chosen step.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use crate::fs::entry::DirectoryEntry;

/// Raw directory and file access.
///
/// Implementations return unsorted listings and plain [`io::Error`]s; the
/// callers decide how to classify failures.
pub trait FilesystemGateway: Send + Sync {
    /// Lists the immediate children of `dir`.
    fn list_directory(&self, dir: &Path) -> io::Result<Vec<DirectoryEntry>>;

    /// Reads a whole file into memory.
    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Creates `path` and writes `contents`.
    ///
    /// Never replaces an existing file: if `path` already exists the call
    /// fails with [`io::ErrorKind::AlreadyExists`] and the file is untouched.
    fn write_file(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Removes a single file.
    fn remove_file(&self, path: &Path) -> io::Result<()>;
}

/// The local disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl FilesystemGateway for LocalFs {
    fn list_directory(&self, dir: &Path) -> io::Result<Vec<DirectoryEntry>> {
        let mut entries = Vec::new();

        for dir_entry in std::fs::read_dir(dir)? {
            let dir_entry = match dir_entry {
                Ok(e) => e,
                Err(_) => continue,
            };
            // Entries vanishing between readdir and stat are skipped.
            let metadata = match dir_entry.metadata() {
                Ok(m) => m,
                Err(_) => continue,
            };
            entries.push(DirectoryEntry::new(dir_entry.file_name(), &metadata));
        }

        Ok(entries)
    }

    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn write_file(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
        let written = file.write_all(contents).and_then(|()| file.sync_all());
        drop(file);
        if written.is_err() {
            // Only ever a file this call created.
            let _ = std::fs::remove_file(path);
        }
        written
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }
}

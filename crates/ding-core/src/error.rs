//! Error types for `ding-core`.
//!
//! All fallible operations in the core library return [`CoreResult<T>`],
//! which is an alias for `Result<T, CoreError>`.

use std::io;
use std::path::PathBuf;

/// Unified error type for all core operations.
///
/// Each variant captures the file or directory involved so the caller can
/// render a message without extra bookkeeping. None of them is fatal to the
/// process.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The target path does not exist.
    #[error("path not found: {0}")]
    NotFound(PathBuf),

    /// The process lacks permission to access the path.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// A directory was expected but the path points to a file.
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Listing or reading a directory failed.
    #[error("could not read {path}: {source}")]
    FilesystemRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The sentinel write test failed; the move was aborted before touching any data.
    #[error("test to write {dir} failed: {source}")]
    PermissionCheck {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The inbound file could not be read; nothing was written.
    #[error("could not read original file {path}; did not move it: {source}")]
    SourceRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Writing into the destination failed; the original is untouched.
    #[error("could not write {path}; did not move it: {source}")]
    DestinationWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The copy landed but the original could not be removed. Both files exist.
    #[error(
        "copied to {destination} but could not remove original {source_path}, please remove it manually: {source}"
    )]
    PartialMove {
        source_path: PathBuf,
        destination: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A requested file name is unusable (empty, a path, `.` or `..`).
    #[error("invalid name: {0}")]
    InvalidName(String),

    /// Failed to parse a TOML configuration file.
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// An external program (OCR, viewer) failed.
    #[error("{program} failed: {message}")]
    Tool { program: String, message: String },

    /// An I/O error that doesn't fit a more specific variant.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl CoreError {
    /// Returns `true` when the error left duplicate data behind that an
    /// operator has to clean up.
    pub fn is_partial_move(&self) -> bool {
        matches!(self, CoreError::PartialMove { .. })
    }

    /// Classifies an I/O error raised while listing `path`.
    pub(crate) fn from_listing(path: PathBuf, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => CoreError::NotFound(path),
            io::ErrorKind::PermissionDenied => CoreError::PermissionDenied(path),
            _ => CoreError::FilesystemRead { path, source: err },
        }
    }
}

/// Convenience alias used throughout `ding-core`.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn denied() -> io::Error {
        io::Error::new(io::ErrorKind::PermissionDenied, "read-only file system")
    }

    #[test]
    fn not_found_displays_path() {
        let err = CoreError::NotFound(PathBuf::from("/missing/file"));
        assert_eq!(err.to_string(), "path not found: /missing/file");
    }

    #[test]
    fn permission_check_names_directory() {
        let err = CoreError::PermissionCheck {
            dir: PathBuf::from("/docs/taxes"),
            source: denied(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/docs/taxes"));
        assert!(msg.contains("read-only file system"));
    }

    #[test]
    fn partial_move_mentions_manual_cleanup() {
        let err = CoreError::PartialMove {
            source_path: PathBuf::from("/inbox/scan.pdf"),
            destination: PathBuf::from("/docs/taxes/invoice.pdf"),
            source: denied(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/inbox/scan.pdf"));
        assert!(msg.contains("/docs/taxes/invoice.pdf"));
        assert!(msg.contains("manually"));
        assert!(err.is_partial_move());
    }

    #[test]
    fn only_partial_move_is_partial() {
        let err = CoreError::DestinationWrite {
            path: PathBuf::from("/docs/x.pdf"),
            source: denied(),
        };
        assert!(!err.is_partial_move());
    }

    #[test]
    fn listing_errors_are_classified() {
        let missing = io::Error::new(io::ErrorKind::NotFound, "gone");
        assert!(matches!(
            CoreError::from_listing(PathBuf::from("/a"), missing),
            CoreError::NotFound(_)
        ));
        assert!(matches!(
            CoreError::from_listing(PathBuf::from("/a"), denied()),
            CoreError::PermissionDenied(_)
        ));
        let other = io::Error::other("disk on fire");
        assert!(matches!(
            CoreError::from_listing(PathBuf::from("/a"), other),
            CoreError::FilesystemRead { .. }
        ));
    }

    #[test]
    fn tool_error_displays_program() {
        let err = CoreError::Tool {
            program: "ocrmypdf".to_string(),
            message: "exit status 2".to_string(),
        };
        assert_eq!(err.to_string(), "ocrmypdf failed: exit status 2");
    }

    #[test]
    fn io_error_from_std() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let core_err: CoreError = io_err.into();
        assert!(matches!(core_err, CoreError::Io(_)));
        assert!(core_err.to_string().contains("gone"));
    }
}

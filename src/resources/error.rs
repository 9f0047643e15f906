// ABOUTME: Resource gathering error types with SNAFU pattern.
// ABOUTME: Every variant records the path being processed.

use snafu::Snafu;
use std::path::PathBuf;

/// Failure while listing, hashing or archiving application bits.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ResourceError {
    #[snafu(display("failed to walk {}: {source}", path.display()))]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },

    #[snafu(display("failed to read {}: {source}", path.display()))]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("failed to process archive {}: {source}", path.display()))]
    Zip {
        path: PathBuf,
        source: zip::result::ZipError,
    },

    #[snafu(display("no files to push in {}", path.display()))]
    EmptyDirectory { path: PathBuf },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceErrorKind {
    /// The path could not be read from disk.
    Unreadable,
    /// The archive is corrupt or could not be written.
    BadArchive,
    /// There is nothing to upload.
    Empty,
}

impl ResourceError {
    pub fn kind(&self) -> ResourceErrorKind {
        match self {
            ResourceError::Walk { .. } | ResourceError::Io { .. } => ResourceErrorKind::Unreadable,
            ResourceError::Zip { .. } => ResourceErrorKind::BadArchive,
            ResourceError::EmptyDirectory { .. } => ResourceErrorKind::Empty,
        }
    }
}

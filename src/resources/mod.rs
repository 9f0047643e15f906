// ABOUTME: Application bits as a list of file resources.
// ABOUTME: Gathering, archiving and matched/unmatched partitioning for uploads.

mod error;
mod local;

pub use error::{ResourceError, ResourceErrorKind};
pub use local::LocalResources;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Read;
use std::path::{Path, PathBuf};

/// One file or directory in the application bits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resource {
    /// Slash-separated path relative to the bits root. Directories end in `/`.
    pub path: String,
    pub size: u64,
    /// Hex SHA-256 of the contents; empty for directories.
    pub checksum: String,
    pub mode: u32,
}

impl Resource {
    pub fn is_directory(&self) -> bool {
        self.path.ends_with('/')
    }
}

/// Collaborator that turns bits on disk into resources and archives.
pub trait ResourceGatherer: Send + Sync {
    fn gather_directory_resources(&self, dir: &Path) -> Result<Vec<Resource>, ResourceError>;

    fn gather_archive_resources(&self, archive: &Path) -> Result<Vec<Resource>, ResourceError>;

    /// Zip only `resources` out of `dir`, returning the new archive's path.
    fn zip_directory_resources(
        &self,
        dir: &Path,
        resources: &[Resource],
    ) -> Result<PathBuf, ResourceError>;

    /// Re-zip only `resources` out of an existing archive.
    fn zip_archive_resources(
        &self,
        archive: &Path,
        resources: &[Resource],
    ) -> Result<PathBuf, ResourceError>;

    /// Open an archive for upload, returning the stream and its size in bytes.
    fn read_archive(&self, path: &Path) -> Result<(Box<dyn Read + Send>, u64), ResourceError>;
}

/// Resources in `all` that are not in `matched`, in their original order.
///
/// Together with `matched` this covers `all` exactly once.
pub fn unmatched_resources(all: &[Resource], matched: &[Resource]) -> Vec<Resource> {
    let known: HashSet<(&str, &str)> = matched
        .iter()
        .map(|r| (r.path.as_str(), r.checksum.as_str()))
        .collect();

    all.iter()
        .filter(|r| !known.contains(&(r.path.as_str(), r.checksum.as_str())))
        .cloned()
        .collect()
}

/// Files worth asking the platform about; empty files and directories never match.
pub fn matchable_resources(all: &[Resource]) -> Vec<Resource> {
    all.iter()
        .filter(|r| !r.is_directory() && r.size > 0)
        .cloned()
        .collect()
}

// ABOUTME: Filesystem-backed resource gathering and archiving.
// ABOUTME: Walks directories, hashes files with SHA-256 and writes zip archives.

use sha2::{Digest, Sha256};
use snafu::ResultExt;
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use walkdir::WalkDir;
use zip::{CompressionMethod, ZipArchive, ZipWriter, write::SimpleFileOptions};

use super::error::{EmptyDirectorySnafu, IoSnafu, WalkSnafu, ZipSnafu};
use super::{Resource, ResourceError, ResourceGatherer};

/// Entries never uploaded, wherever they appear in the tree.
const DEFAULT_IGNORED: &[&str] = &[".cfignore", ".git", ".hg", ".svn", "_darcs", ".DS_Store"];

/// Mode recorded when the platform gives us nothing better.
const DEFAULT_MODE: u32 = 0o744;

#[derive(Debug, Clone, Default)]
pub struct LocalResources {
    /// Where new archives are written. The system temp dir when unset.
    archive_dir: Option<PathBuf>,
}

impl LocalResources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_archive_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.archive_dir = Some(dir.into());
        self
    }

    fn is_ignored(name: &str, rel: &str) -> bool {
        DEFAULT_IGNORED.contains(&name) || rel == "manifest.yml" || rel == "manifest.yaml"
    }

    /// Create a zip with `fill` and keep it only once it is complete.
    ///
    /// The temp file is removed if any entry or the central directory fails
    /// to write.
    fn write_archive<F>(&self, fill: F) -> Result<PathBuf, ResourceError>
    where
        F: FnOnce(&mut ZipWriter<NamedTempFile>, &Path) -> Result<(), ResourceError>,
    {
        let dir = self.archive_dir.clone().unwrap_or_else(std::env::temp_dir);
        let temp = tempfile::Builder::new()
            .prefix("cfpush-bits-")
            .suffix(".zip")
            .tempfile_in(&dir)
            .context(IoSnafu { path: &dir })?;
        let archive_path = temp.path().to_path_buf();

        let mut zip = ZipWriter::new(temp);
        fill(&mut zip, &archive_path)?;
        let temp = zip.finish().context(ZipSnafu {
            path: &archive_path,
        })?;

        temp.keep().map_err(|e| ResourceError::Io {
            path: e.file.path().to_path_buf(),
            source: e.error,
        })?;
        Ok(archive_path)
    }
}

impl ResourceGatherer for LocalResources {
    fn gather_directory_resources(&self, dir: &Path) -> Result<Vec<Resource>, ResourceError> {
        let mut resources = Vec::new();

        let walker = WalkDir::new(dir)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                let name = entry.file_name().to_string_lossy();
                let rel = relative_path(dir, entry.path());
                !Self::is_ignored(&name, &rel)
            });

        for entry in walker {
            let entry = entry.context(WalkSnafu { path: dir })?;
            let rel = relative_path(dir, entry.path());

            if entry.file_type().is_dir() {
                resources.push(Resource {
                    path: format!("{}/", rel),
                    size: 0,
                    checksum: String::new(),
                    mode: mode_of(entry.path()),
                });
                continue;
            }

            let mut file = File::open(entry.path()).context(IoSnafu { path: entry.path() })?;
            let (checksum, size) =
                sha256_of(&mut file).context(IoSnafu { path: entry.path() })?;
            resources.push(Resource {
                path: rel,
                size,
                checksum,
                mode: mode_of(entry.path()),
            });
        }

        if resources.iter().all(Resource::is_directory) {
            return EmptyDirectorySnafu { path: dir }.fail();
        }

        tracing::debug!(
            "gathered {} resources from {}",
            resources.len(),
            dir.display()
        );
        Ok(resources)
    }

    fn gather_archive_resources(&self, archive: &Path) -> Result<Vec<Resource>, ResourceError> {
        let file = File::open(archive).context(IoSnafu { path: archive })?;
        let mut zip = ZipArchive::new(file).context(ZipSnafu { path: archive })?;
        let mut resources = Vec::with_capacity(zip.len());

        for index in 0..zip.len() {
            let mut entry = zip.by_index(index).context(ZipSnafu { path: archive })?;
            let name = entry.name().to_string();
            let mode = entry.unix_mode().map_or(DEFAULT_MODE, |m| m & 0o777);

            if entry.is_dir() {
                resources.push(Resource {
                    path: name,
                    size: 0,
                    checksum: String::new(),
                    mode,
                });
                continue;
            }

            let (checksum, size) = sha256_of(&mut entry).context(IoSnafu { path: archive })?;
            resources.push(Resource {
                path: name,
                size,
                checksum,
                mode,
            });
        }

        Ok(resources)
    }

    fn zip_directory_resources(
        &self,
        dir: &Path,
        resources: &[Resource],
    ) -> Result<PathBuf, ResourceError> {
        self.write_archive(|zip, archive_path| {
            for resource in resources {
                let options = SimpleFileOptions::default()
                    .compression_method(CompressionMethod::Deflated)
                    .unix_permissions(resource.mode);

                if resource.is_directory() {
                    zip.add_directory(resource.path.as_str(), options)
                        .context(ZipSnafu { path: archive_path })?;
                    continue;
                }

                let source = dir.join(&resource.path);
                let mut src = File::open(&source).context(IoSnafu { path: &source })?;
                zip.start_file(resource.path.as_str(), options)
                    .context(ZipSnafu { path: archive_path })?;
                io::copy(&mut src, zip).context(IoSnafu { path: &source })?;
            }
            Ok(())
        })
    }

    fn zip_archive_resources(
        &self,
        archive: &Path,
        resources: &[Resource],
    ) -> Result<PathBuf, ResourceError> {
        let wanted: HashSet<&str> = resources.iter().map(|r| r.path.as_str()).collect();
        let source = File::open(archive).context(IoSnafu { path: archive })?;
        let mut reader = ZipArchive::new(source).context(ZipSnafu { path: archive })?;

        self.write_archive(|zip, archive_path| {
            for index in 0..reader.len() {
                let mut entry = reader.by_index(index).context(ZipSnafu { path: archive })?;
                let name = entry.name().to_string();
                if !wanted.contains(name.as_str()) {
                    continue;
                }

                let options = SimpleFileOptions::default()
                    .compression_method(CompressionMethod::Deflated)
                    .unix_permissions(entry.unix_mode().map_or(DEFAULT_MODE, |m| m & 0o777));

                if entry.is_dir() {
                    zip.add_directory(name, options)
                        .context(ZipSnafu { path: archive_path })?;
                    continue;
                }

                zip.start_file(name, options)
                    .context(ZipSnafu { path: archive_path })?;
                io::copy(&mut entry, zip).context(IoSnafu { path: archive })?;
            }
            Ok(())
        })
    }

    fn read_archive(&self, path: &Path) -> Result<(Box<dyn Read + Send>, u64), ResourceError> {
        let file = File::open(path).context(IoSnafu { path })?;
        let size = file.metadata().context(IoSnafu { path })?.len();
        Ok((Box::new(file), size))
    }
}

fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

fn sha256_of(reader: &mut impl Read) -> io::Result<(String, u64)> {
    let mut hasher = Sha256::new();
    let size = io::copy(reader, &mut HashWriter(&mut hasher))?;
    Ok((hex::encode(hasher.finalize()), size))
}

struct HashWriter<'a>(&'a mut Sha256);

impl Write for HashWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(unix)]
fn mode_of(path: &Path) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o777)
        .unwrap_or(DEFAULT_MODE)
}

#[cfg(not(unix))]
fn mode_of(_path: &Path) -> u32 {
    DEFAULT_MODE
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn sample_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("app.rb"), "puts 'hi'").unwrap();
        fs::create_dir(dir.path().join("lib")).unwrap();
        fs::write(dir.path().join("lib/util.rb"), "module Util; end").unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".git/HEAD"), "ref").unwrap();
        fs::write(dir.path().join("manifest.yml"), "applications: []").unwrap();
        dir
    }

    #[test]
    fn gathers_files_and_directories_without_ignored_entries() {
        let dir = sample_dir();
        let resources = LocalResources::new()
            .gather_directory_resources(dir.path())
            .unwrap();

        let paths: Vec<_> = resources.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, ["app.rb", "lib/", "lib/util.rb"]);

        let app = &resources[0];
        assert_eq!(app.size, 9);
        assert_eq!(app.checksum.len(), 64);
    }

    #[test]
    fn empty_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("only-a-dir")).unwrap();

        let err = LocalResources::new()
            .gather_directory_resources(dir.path())
            .unwrap_err();
        assert_eq!(err.kind(), super::super::ResourceErrorKind::Empty);
    }

    #[test]
    fn zips_only_requested_resources_and_regathers_them() {
        let dir = sample_dir();
        let gatherer = LocalResources::new();
        let resources = gatherer.gather_directory_resources(dir.path()).unwrap();
        let subset: Vec<_> = resources
            .iter()
            .filter(|r| r.path.starts_with("lib"))
            .cloned()
            .collect();

        let archive = gatherer.zip_directory_resources(dir.path(), &subset).unwrap();
        let from_archive = gatherer.gather_archive_resources(&archive).unwrap();
        fs::remove_file(&archive).unwrap();

        let paths: Vec<_> = from_archive.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, ["lib/", "lib/util.rb"]);
        assert_eq!(from_archive[1].checksum, subset[1].checksum);
    }

    #[test]
    fn rezips_a_subset_of_an_archive() {
        let dir = sample_dir();
        let gatherer = LocalResources::new();
        let resources = gatherer.gather_directory_resources(dir.path()).unwrap();
        let full = gatherer.zip_directory_resources(dir.path(), &resources).unwrap();

        let only_app: Vec<_> = resources
            .iter()
            .filter(|r| r.path == "app.rb")
            .cloned()
            .collect();
        let partial = gatherer.zip_archive_resources(&full, &only_app).unwrap();
        let listed = gatherer.gather_archive_resources(&partial).unwrap();

        fs::remove_file(&full).unwrap();
        fs::remove_file(&partial).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].path, "app.rb");
    }

    #[test]
    fn failed_zip_leaves_no_archive_behind() {
        let dir = sample_dir();
        let scratch = tempfile::tempdir().unwrap();
        let gatherer = LocalResources::new().with_archive_dir(scratch.path());
        let mut resources = gatherer.gather_directory_resources(dir.path()).unwrap();
        fs::remove_file(dir.path().join("lib/util.rb")).unwrap();

        let err = gatherer
            .zip_directory_resources(dir.path(), &resources)
            .unwrap_err();
        assert_eq!(err.kind(), super::super::ResourceErrorKind::Unreadable);
        assert_eq!(fs::read_dir(scratch.path()).unwrap().count(), 0);

        resources.retain(|r| r.path != "lib/util.rb");
        let archive = gatherer
            .zip_directory_resources(dir.path(), &resources)
            .unwrap();
        assert!(archive.starts_with(scratch.path()));
        assert_eq!(fs::read_dir(scratch.path()).unwrap().count(), 1);
    }

    #[test]
    fn read_archive_reports_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("droplet.tgz");
        fs::write(&path, vec![7u8; 42]).unwrap();

        let (mut reader, size) = LocalResources::new().read_archive(&path).unwrap();
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).unwrap();
        assert_eq!(size, 42);
        assert_eq!(buf.len(), 42);
    }
}

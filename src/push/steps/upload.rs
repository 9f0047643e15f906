// ABOUTME: Bounded retry loop shared by bits and droplet uploads.
// ABOUTME: Only interrupted-transfer errors are retried; the archive is re-read each attempt.

use std::path::{Path, PathBuf};

use crate::platform::{ArchiveUpload, Package, Platform};
use crate::push::event::Event;
use crate::push::{PushActor, PushError};
use crate::resources::{Resource, ResourceGatherer};
use crate::types::{AppGuid, DropletGuid};

use super::StepContext;

/// Where an archive is being sent.
pub(super) enum UploadTarget<'a> {
    Bits {
        package: &'a Package,
        matched: &'a [Resource],
    },
    Droplet {
        droplet: &'a DropletGuid,
        app: &'a AppGuid,
    },
}

impl UploadTarget<'_> {
    fn uploading_event(&self) -> Event {
        match self {
            UploadTarget::Bits { .. } => Event::UploadingApplicationWithArchive,
            UploadTarget::Droplet { .. } => Event::UploadingDroplet,
        }
    }

    fn complete_event(&self) -> Event {
        match self {
            UploadTarget::Bits { .. } => Event::UploadWithArchiveComplete,
            UploadTarget::Droplet { .. } => Event::UploadDropletComplete,
        }
    }
}

/// A temporary archive, deleted when dropped.
pub(super) struct TempArchive(PathBuf);

impl TempArchive {
    pub(super) fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub(super) fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for TempArchive {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.0) {
            tracing::debug!("could not remove {}: {}", self.0.display(), e);
        }
    }
}

impl<P, R> PushActor<P, R>
where
    P: Platform + 'static,
    R: ResourceGatherer + 'static,
{
    /// Upload `archive`, retrying interrupted transfers.
    ///
    /// Returns the package reported by a bits upload, `None` for droplets.
    pub(super) async fn upload_with_retry(
        &self,
        archive: &Path,
        target: UploadTarget<'_>,
        ctx: &mut StepContext<'_>,
    ) -> Result<Option<Package>, PushError> {
        let attempts = self.config.upload_retries.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;

            ctx.emit(Event::ReadingArchive).await;
            let (reader, size) = self.resources.read_archive(archive)?;
            let upload = ArchiveUpload {
                reader: ctx.progress.wrap(reader, size),
                size,
            };

            ctx.emit(target.uploading_event()).await;
            let result = match &target {
                UploadTarget::Bits { package, matched } => {
                    let outcome = self
                        .platform
                        .upload_bits_package(package, matched, Some(upload))
                        .await;
                    ctx.collect(outcome).map(Some)
                }
                UploadTarget::Droplet { droplet, app } => {
                    let outcome = self.platform.upload_droplet(droplet, app, upload).await;
                    ctx.collect(outcome).map(|()| None)
                }
            };

            match result {
                Ok(package) => {
                    ctx.progress.complete();
                    ctx.emit(target.complete_event()).await;
                    return Ok(package);
                }
                Err(err) if err.is_retryable() => {
                    tracing::warn!("upload attempt {}/{} interrupted: {}", attempt, attempts, err);
                    if attempt >= attempts {
                        return Err(PushError::UploadFailed {
                            attempts,
                            cause: err,
                        });
                    }
                    ctx.emit(Event::RetryUpload).await;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

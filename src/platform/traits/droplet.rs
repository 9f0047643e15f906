// ABOUTME: Staging and droplet operations on the remote platform.
// ABOUTME: Builds turn packages into droplets; droplets can also be uploaded directly.

use async_trait::async_trait;

use crate::platform::{ArchiveUpload, Build, Droplet, Outcome};
use crate::types::{AppGuid, AppName, BuildGuid, DropletGuid, PackageGuid};

#[async_trait]
pub trait DropletOps: Send + Sync {
    /// Start a build of the package.
    async fn stage_package(&self, package: &PackageGuid) -> Outcome<Build>;

    /// Wait for a build to finish and return the droplet it produced.
    async fn poll_build(&self, build: &BuildGuid, app_name: &AppName) -> Outcome<Droplet>;

    /// Create an empty droplet ready to receive an uploaded tarball.
    async fn create_droplet(&self, app: &AppGuid) -> Outcome<Droplet>;

    /// Upload a droplet tarball. A `PipeSeek` error means resend.
    async fn upload_droplet(
        &self,
        droplet: &DropletGuid,
        app: &AppGuid,
        archive: ArchiveUpload,
    ) -> Outcome<()>;
}

// ABOUTME: Package operations on the remote platform.
// ABOUTME: Resource matching, bits and docker packages, upload and polling.

use async_trait::async_trait;

use crate::platform::{ArchiveUpload, DockerCredentials, Outcome, Package};
use crate::resources::Resource;
use crate::types::AppGuid;

#[async_trait]
pub trait PackageOps: Send + Sync {
    /// Return the subset of `resources` the platform already stores.
    async fn resource_match(&self, resources: &[Resource]) -> Outcome<Vec<Resource>>;

    async fn create_bits_package(&self, app: &AppGuid) -> Outcome<Package>;

    async fn create_docker_package(
        &self,
        app: &AppGuid,
        credentials: &DockerCredentials,
    ) -> Outcome<Package>;

    /// Upload bits: `matched` are reused from the platform's cache, `archive`
    /// carries everything else. `archive` is `None` when nothing is new.
    ///
    /// A `PipeSeek` error means the body must be read again and resent.
    async fn upload_bits_package(
        &self,
        package: &Package,
        matched: &[Resource],
        archive: Option<ArchiveUpload>,
    ) -> Outcome<Package>;

    /// Wait until the package is ready to stage.
    async fn poll_package(&self, package: &Package) -> Outcome<Package>;
}

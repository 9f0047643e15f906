// ABOUTME: Application lifecycle operations on the remote platform.
// ABOUTME: Lookup, create, update, stop, restart, set droplet and poll for startup.

use async_trait::async_trait;

use super::InstanceDetailsSender;
use crate::platform::{Application, Outcome};
use crate::types::{AppGuid, AppName, DropletGuid, SpaceGuid};

#[async_trait]
pub trait AppOps: Send + Sync {
    /// Find an application by name. Fails with `ApplicationNotFound`.
    async fn get_application_by_name(
        &self,
        name: &AppName,
        space: &SpaceGuid,
    ) -> Outcome<Application>;

    /// Create an application. Fails with `ApplicationAlreadyExists`.
    async fn create_application(
        &self,
        app: &Application,
        space: &SpaceGuid,
    ) -> Outcome<Application>;

    /// Update lifecycle settings (buildpacks, stack) of an existing application.
    async fn update_application(&self, app: &Application) -> Outcome<Application>;

    async fn stop_application(&self, app: &AppGuid) -> Outcome<()>;

    async fn restart_application(&self, app: &AppGuid, no_wait: bool) -> Outcome<()>;

    /// Wait for instances to become healthy, reporting status changes on `details`.
    ///
    /// With `no_wait`, returns once the first instance is running.
    async fn poll_start(
        &self,
        app: &Application,
        no_wait: bool,
        details: InstanceDetailsSender,
    ) -> Outcome<()>;

    async fn set_application_droplet(&self, app: &AppGuid, droplet: &DropletGuid) -> Outcome<()>;
}

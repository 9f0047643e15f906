// ABOUTME: Zero-downtime deployment operations on the remote platform.
// ABOUTME: Create a rolling or canary deployment and wait for it to settle.

use async_trait::async_trait;

use super::InstanceDetailsSender;
use crate::platform::{Application, DeploymentRequest, Outcome};
use crate::types::DeploymentGuid;

#[async_trait]
pub trait DeploymentOps: Send + Sync {
    async fn create_deployment(&self, request: &DeploymentRequest) -> Outcome<DeploymentGuid>;

    /// Wait for the deployment's new instances, reporting status on `details`.
    ///
    /// With `no_wait`, returns once the deployment has started.
    async fn poll_deployment(
        &self,
        app: &Application,
        deployment: &DeploymentGuid,
        no_wait: bool,
        details: InstanceDetailsSender,
    ) -> Outcome<()>;
}

// ABOUTME: The push plan threaded through builders and steps.
// ABOUTME: Holds desired configuration and the artifacts produced while pushing.

use serde::Serialize;
use std::path::PathBuf;

use crate::config::DeploymentStrategy;
use crate::platform::{
    Application, DeploymentOptions, DockerCredentials, LifecycleType, ProcessScale,
    ProcessUpdate, Route,
};
use crate::resources::Resource;
use crate::types::{AppName, DropletGuid, OrgGuid, PackageGuid, SpaceGuid};

/// Everything known about one application's push.
///
/// Builders fill in the desired state before any remote call. Steps then
/// take the plan by reference and return an updated copy, so a failed step
/// never leaves a half-applied plan behind.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PushPlan {
    pub org_guid: OrgGuid,
    pub space_guid: SpaceGuid,
    pub application: Application,

    // Source. Exactly one of bits, droplet or docker drives the push.
    pub bits_path: Option<PathBuf>,
    pub droplet_path: Option<PathBuf>,
    pub docker: Option<DockerCredentials>,
    pub docker_needs_update: bool,
    pub is_archive: bool,
    pub all_resources: Vec<Resource>,

    // Filled in by steps; never cleared once set.
    pub package_guid: PackageGuid,
    pub droplet_guid: DropletGuid,

    pub no_start: bool,
    pub no_wait: bool,
    pub task: bool,

    pub strategy: DeploymentStrategy,
    pub deployment: DeploymentOptions,

    pub scale: ProcessScale,
    pub scale_needs_update: bool,
    pub process_update: ProcessUpdate,
    pub process_needs_update: bool,
    pub application_needs_update: bool,

    pub skip_route_creation: bool,
    pub random_route: bool,
    pub application_routes: Vec<Route>,
}

impl PushPlan {
    pub fn new(org_guid: OrgGuid, space_guid: SpaceGuid, name: AppName) -> Self {
        Self {
            org_guid,
            space_guid,
            application: Application::named(name),
            ..Self::default()
        }
    }

    pub fn app_name(&self) -> &AppName {
        &self.application.name
    }

    pub fn is_docker(&self) -> bool {
        self.application.lifecycle == LifecycleType::Docker
    }

    pub fn docker_image(&self) -> Option<&str> {
        self.docker.as_ref().map(|d| d.image.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_plan_has_no_artifacts() {
        let plan = PushPlan::new(
            OrgGuid::new("org"),
            SpaceGuid::new("space"),
            AppName::new("web").unwrap(),
        );

        assert_eq!(plan.app_name().as_str(), "web");
        assert!(plan.package_guid.is_empty());
        assert!(plan.droplet_guid.is_empty());
        assert!(!plan.application.exists());
        assert!(!plan.is_docker());
    }

    #[test]
    fn plan_serializes_without_docker_password() {
        let mut plan = PushPlan::default();
        plan.docker = Some(DockerCredentials {
            image: "registry/app:2".into(),
            username: Some("bot".into()),
            password: Some("s3cret".into()),
        });

        let json = serde_json::to_string(&plan).unwrap();
        assert!(json.contains("registry/app:2"));
        assert!(!json.contains("s3cret"));
    }
}

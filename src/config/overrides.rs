// ABOUTME: Resolved command-line overrides for a push.
// ABOUTME: Already validated upstream; plan builders only read these fields.

use std::path::PathBuf;

use super::{DeploymentStrategy, HealthCheckType, Megabytes};

/// Flag values that take precedence over the manifest.
///
/// `None`/empty/`false` means "not given on the command line".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagOverrides {
    pub provided_app_path: Option<PathBuf>,
    pub droplet_path: Option<PathBuf>,

    pub docker_image: Option<String>,
    pub docker_username: Option<String>,
    pub docker_password: Option<String>,

    pub buildpacks: Vec<String>,
    pub stack: Option<String>,

    pub memory: Option<Megabytes>,
    pub disk: Option<Megabytes>,
    pub instances: Option<u32>,
    pub log_rate_limit: Option<Megabytes>,

    pub health_check_type: Option<HealthCheckType>,
    pub health_check_endpoint: Option<String>,
    pub health_check_timeout: Option<u32>,
    pub start_command: Option<String>,

    pub strategy: DeploymentStrategy,
    pub max_in_flight: Option<u32>,
    /// Canary step weights, in percent.
    pub instance_steps: Vec<u32>,

    pub no_start: bool,
    pub no_wait: bool,
    pub no_route: bool,
    pub random_route: bool,
    pub task: bool,
}

impl FlagOverrides {
    /// Whether any override targets a single application's settings.
    ///
    /// These cannot be applied to a multi-application manifest without an
    /// application name to pin them to.
    pub fn targets_single_app(&self) -> bool {
        self.provided_app_path.is_some()
            || self.droplet_path.is_some()
            || self.docker_image.is_some()
            || !self.buildpacks.is_empty()
            || self.stack.is_some()
            || self.memory.is_some()
            || self.disk.is_some()
            || self.instances.is_some()
            || self.log_rate_limit.is_some()
            || self.health_check_type.is_some()
            || self.health_check_endpoint.is_some()
            || self.health_check_timeout.is_some()
            || self.start_command.is_some()
    }
}

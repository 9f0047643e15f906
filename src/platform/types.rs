// ABOUTME: Wire-agnostic records exchanged with the remote platform.
// ABOUTME: Applications, packages, droplets, routes and deployment requests.

use serde::Serialize;
use std::fmt;
use std::io::Read;

use crate::config::{DeploymentStrategy, HealthCheckType, Megabytes};
use crate::types::{
    AppGuid, AppName, BuildGuid, DomainGuid, DropletGuid, PackageGuid, RouteGuid,
};

/// Desired run state recorded by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationState {
    #[default]
    Stopped,
    Started,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleType {
    #[default]
    Buildpack,
    Docker,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Application {
    pub name: AppName,
    /// Empty until the application exists on the platform.
    pub guid: AppGuid,
    pub lifecycle: LifecycleType,
    pub buildpacks: Vec<String>,
    pub stack: Option<String>,
    pub state: ApplicationState,
}

impl Application {
    pub fn named(name: AppName) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    pub fn exists(&self) -> bool {
        !self.guid.is_empty()
    }

    pub fn is_started(&self) -> bool {
        self.state == ApplicationState::Started
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum PackageState {
    #[default]
    AwaitingUpload,
    Processing,
    Ready,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Package {
    pub guid: PackageGuid,
    pub state: PackageState,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Build {
    pub guid: BuildGuid,
    pub package: PackageGuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Droplet {
    pub guid: DropletGuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Domain {
    pub guid: DomainGuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Route {
    pub guid: RouteGuid,
    pub host: String,
    pub domain: Domain,
    pub path: String,
}

impl Route {
    /// `host.domain/path` as users type it.
    pub fn url(&self) -> String {
        let mut url = if self.host.is_empty() {
            self.domain.name.clone()
        } else {
            format!("{}.{}", self.host, self.domain.name)
        };
        url.push_str(&self.path);
        url
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url())
    }
}

/// Image reference and registry credentials for a docker package.
#[derive(Clone, PartialEq, Eq, Default, Serialize)]
pub struct DockerCredentials {
    pub image: String,
    pub username: Option<String>,
    #[serde(skip)]
    pub password: Option<String>,
}

// Password stays out of logs.
impl fmt::Debug for DockerCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DockerCredentials")
            .field("image", &self.image)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Requested web process scale; `None` leaves a dimension unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ProcessScale {
    pub instances: Option<u32>,
    pub memory: Option<Megabytes>,
    pub disk: Option<Megabytes>,
    pub log_rate_limit: Option<Megabytes>,
}

impl ProcessScale {
    pub fn is_empty(&self) -> bool {
        self.instances.is_none()
            && self.memory.is_none()
            && self.disk.is_none()
            && self.log_rate_limit.is_none()
    }
}

/// Requested web process configuration; `None` leaves a field unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ProcessUpdate {
    pub health_check_type: Option<HealthCheckType>,
    pub health_check_endpoint: Option<String>,
    pub health_check_timeout: Option<u32>,
    pub command: Option<String>,
}

impl ProcessUpdate {
    pub fn is_empty(&self) -> bool {
        self.health_check_type.is_none()
            && self.health_check_endpoint.is_none()
            && self.health_check_timeout.is_none()
            && self.command.is_none()
    }
}

/// Tuning knobs for rolling and canary deployments.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DeploymentOptions {
    pub max_in_flight: Option<u32>,
    /// Canary step weights, in percent.
    pub canary_steps: Vec<u32>,
    pub instances: Option<u32>,
    pub memory: Option<Megabytes>,
    pub disk: Option<Megabytes>,
    pub log_rate_limit: Option<Megabytes>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentRequest {
    pub app: AppGuid,
    pub droplet: DropletGuid,
    pub strategy: DeploymentStrategy,
    pub options: DeploymentOptions,
}

/// Archive bytes handed to an upload call.
pub struct ArchiveUpload {
    pub reader: Box<dyn Read + Send>,
    pub size: u64,
}

impl fmt::Debug for ArchiveUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchiveUpload")
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

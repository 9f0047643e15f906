// ABOUTME: Per-application records read from the manifest.
// ABOUTME: Read-only input to plan builders; no interpolation happens here.

use serde::Deserialize;
use std::path::PathBuf;

use super::{HealthCheckType, Megabytes};
use crate::types::AppName;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ManifestApplication {
    pub name: AppName,

    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default)]
    pub docker: Option<DockerConfig>,

    #[serde(default)]
    pub buildpacks: Vec<String>,

    #[serde(default)]
    pub stack: Option<String>,

    #[serde(default)]
    pub memory: Option<Megabytes>,

    #[serde(default, alias = "disk_quota", alias = "disk")]
    pub disk_quota: Option<Megabytes>,

    #[serde(default)]
    pub instances: Option<u32>,

    #[serde(default)]
    pub log_rate_limit_per_second: Option<Megabytes>,

    #[serde(default)]
    pub health_check_type: Option<HealthCheckType>,

    #[serde(default)]
    pub health_check_http_endpoint: Option<String>,

    /// Seconds allowed between start and the first healthy response.
    #[serde(default)]
    pub timeout: Option<u32>,

    #[serde(default)]
    pub command: Option<String>,

    #[serde(default)]
    pub no_route: bool,

    #[serde(default)]
    pub random_route: bool,

    #[serde(default)]
    pub default_route: bool,

    /// Application type; `task` apps are staged but never started.
    #[serde(default, rename = "type")]
    pub app_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DockerConfig {
    pub image: String,
    #[serde(default)]
    pub username: Option<String>,
}

impl ManifestApplication {
    /// A bare record for an application that has no manifest entry.
    pub fn named(name: AppName) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    pub fn docker_image(&self) -> Option<&str> {
        self.docker.as_ref().map(|d| d.image.as_str())
    }

    pub fn is_task(&self) -> bool {
        self.app_type.as_deref() == Some("task")
    }
}

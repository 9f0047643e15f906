// ABOUTME: Manifest model, flag overrides and push tuning.
// ABOUTME: Handles manifest discovery and YAML parsing; no variable interpolation.

mod application;
mod environment;
mod health_check;
mod megabytes;
mod overrides;
mod strategy;

pub use application::{DockerConfig, ManifestApplication};
pub use environment::{PUSH_RETRIES, PushConfig, STAGING_TIMEOUT_VAR, STARTUP_TIMEOUT_VAR};
pub use health_check::HealthCheckType;
pub use megabytes::Megabytes;
pub use overrides::FlagOverrides;
pub use strategy::DeploymentStrategy;

use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

pub const MANIFEST_FILENAME: &str = "manifest.yml";
pub const MANIFEST_FILENAME_ALT: &str = "manifest.yaml";

/// The applications described by a manifest file.
///
/// An empty manifest is valid: pushing by name alone works without one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub applications: Vec<ManifestApplication>,

    /// The parsed document re-serialized, as sent when applying it to a space.
    #[serde(skip)]
    raw: Option<Vec<u8>>,
}

impl Manifest {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let document: serde_yaml::Value = serde_yaml::from_str(yaml)?;
        let mut manifest: Manifest = serde_yaml::from_value(document.clone())?;
        manifest.validate()?;
        manifest.raw = Some(serde_yaml::to_string(&document)?.into_bytes());
        Ok(manifest)
    }

    /// YAML to apply to a space, or `None` when there is no manifest or it
    /// lists no applications.
    pub fn raw_bytes(&self) -> Option<&[u8]> {
        self.raw
            .as_deref()
            .filter(|_| !self.applications.is_empty())
    }

    /// Read a manifest file. Relative application paths are taken from the
    /// manifest's own directory.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut manifest = Self::from_yaml(&content)?;
        if let Some(base) = path.parent() {
            manifest.resolve_paths(base);
        }
        Ok(manifest)
    }

    fn resolve_paths(&mut self, base: &Path) {
        for app in &mut self.applications {
            if let Some(path) = app.path.as_mut().filter(|p| p.is_relative()) {
                *path = base.join(&*path);
            }
        }
    }

    /// Load the manifest from `dir`, or an empty manifest if none exists.
    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [dir.join(MANIFEST_FILENAME), dir.join(MANIFEST_FILENAME_ALT)];

        for path in &candidates {
            if path.exists() {
                tracing::debug!("reading manifest {}", path.display());
                return Self::load(path);
            }
        }

        tracing::debug!("no manifest in {}", dir.display());
        Ok(Self::default())
    }

    pub fn contains_multiple_apps(&self) -> bool {
        self.applications.len() > 1
    }

    pub fn application(&self, name: &str) -> Option<&ManifestApplication> {
        self.applications.iter().find(|app| app.name.as_str() == name)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for app in &self.applications {
            if !seen.insert(app.name.as_str()) {
                return Err(Error::InvalidManifest(format!(
                    "application '{}' is listed more than once",
                    app.name
                )));
            }
            if app.docker.is_some() && app.path.is_some() {
                return Err(Error::InvalidManifest(format!(
                    "application '{}' cannot set both docker and path",
                    app.name
                )));
            }
        }
        Ok(())
    }
}

// ABOUTME: Plan builders that turn manifest entries and flags into push plans.
// ABOUTME: Each builder sets one facet of the plan; they run in a fixed order.

mod lifecycle;
mod process;
mod source;

use crate::config::{FlagOverrides, Manifest, ManifestApplication};
use crate::resources::ResourceGatherer;
use crate::types::{AppName, OrgGuid, SpaceGuid};

use super::{PushError, PushPlan};

/// Read-only inputs shared by every builder.
pub struct BuildContext<'a> {
    pub overrides: &'a FlagOverrides,
    pub manifest_app: &'a ManifestApplication,
    pub resources: &'a dyn ResourceGatherer,
}

pub type PlanBuilder = fn(PushPlan, &BuildContext<'_>) -> Result<PushPlan, PushError>;

/// Builders in the order they run. Later entries read fields set by earlier ones.
pub const BUILDERS: &[(&str, PlanBuilder)] = &[
    ("application", lifecycle::set_application),
    ("docker-credentials", source::set_docker_credentials),
    ("droplet-path", source::set_droplet_path),
    ("bits-path", source::set_bits_path),
    ("all-resources", source::set_all_resources),
    ("deployment-strategy", lifecycle::set_deployment_strategy),
    ("scale", process::set_scale),
    ("process-configuration", process::set_process_configuration),
    ("task", lifecycle::set_task),
    ("no-start", lifecycle::set_no_start),
    ("no-wait", lifecycle::set_no_wait),
    ("routes", process::set_routes),
];

/// Run every builder over a fresh plan for one manifest application.
pub fn build_plan(
    org: &OrgGuid,
    space: &SpaceGuid,
    manifest_app: &ManifestApplication,
    overrides: &FlagOverrides,
    resources: &dyn ResourceGatherer,
) -> Result<PushPlan, PushError> {
    let ctx = BuildContext {
        overrides,
        manifest_app,
        resources,
    };

    let mut plan = PushPlan::new(org.clone(), space.clone(), manifest_app.name.clone());
    for (name, builder) in BUILDERS {
        plan = builder(plan, &ctx)?;
        tracing::trace!("applied {} builder to {}", name, manifest_app.name);
    }
    Ok(plan)
}

/// Build one plan per application to push.
///
/// With `app_name` only that application is pushed: it must appear in the
/// manifest unless the manifest is empty, in which case it is pushed from
/// flags alone. Without `app_name` every manifest application is pushed.
pub fn create_push_plans(
    app_name: Option<&str>,
    space: &SpaceGuid,
    org: &OrgGuid,
    manifest: &Manifest,
    overrides: &FlagOverrides,
    resources: &dyn ResourceGatherer,
) -> Result<Vec<PushPlan>, PushError> {
    validate_overrides(overrides)?;

    let synthesized;
    let targets: Vec<&ManifestApplication> = match app_name {
        Some(name) => {
            let name = AppName::new(name)?;
            if manifest.applications.is_empty() {
                synthesized = ManifestApplication::named(name);
                vec![&synthesized]
            } else {
                let app = manifest
                    .application(name.as_str())
                    .ok_or_else(|| PushError::AppNotFoundInManifest(name.to_string()))?;
                vec![app]
            }
        }
        None => {
            if manifest.applications.is_empty() {
                return Err(PushError::MissingAppName);
            }
            if manifest.contains_multiple_apps() && overrides.targets_single_app() {
                return Err(PushError::InvalidOverrides(
                    "application-specific flags need an application name when the manifest \
                     has several applications"
                        .to_string(),
                ));
            }
            manifest.applications.iter().collect()
        }
    };

    targets
        .into_iter()
        .map(|app| build_plan(org, space, app, overrides, resources))
        .collect()
}

/// Only one source may drive a push.
fn validate_overrides(overrides: &FlagOverrides) -> Result<(), PushError> {
    let sources = [
        overrides.provided_app_path.is_some(),
        overrides.droplet_path.is_some(),
        overrides.docker_image.is_some(),
    ];
    if sources.iter().filter(|given| **given).count() > 1 {
        return Err(PushError::InvalidOverrides(
            "only one of app path, droplet path and docker image may be given".to_string(),
        ));
    }

    if overrides.docker_username.is_some() && overrides.docker_image.is_none() {
        return Err(PushError::InvalidOverrides(
            "docker username requires a docker image".to_string(),
        ));
    }

    if overrides.no_start && overrides.strategy.creates_deployment() {
        return Err(PushError::InvalidOverrides(format!(
            "no-start cannot be combined with the {} strategy",
            overrides.strategy
        )));
    }

    if !overrides.instance_steps.is_empty() && !overrides.strategy.creates_deployment() {
        return Err(PushError::InvalidOverrides(
            "instance steps require the canary strategy".to_string(),
        ));
    }

    Ok(())
}

// ABOUTME: Builders for the push source: bits, droplet or docker image.
// ABOUTME: Gathers the resource list for bits pushes before any remote call.

use crate::platform::DockerCredentials;
use crate::push::{PushError, PushPlan};

use super::BuildContext;

/// No-op unless the application builder chose the docker lifecycle.
pub fn set_docker_credentials(
    mut plan: PushPlan,
    ctx: &BuildContext<'_>,
) -> Result<PushPlan, PushError> {
    if !plan.is_docker() {
        return Ok(plan);
    }

    let manifest_docker = ctx.manifest_app.docker.as_ref();
    let image = ctx
        .overrides
        .docker_image
        .clone()
        .or_else(|| manifest_docker.map(|d| d.image.clone()))
        .unwrap_or_default();
    let username = ctx
        .overrides
        .docker_username
        .clone()
        .or_else(|| manifest_docker.and_then(|d| d.username.clone()));

    plan.docker = Some(DockerCredentials {
        image,
        username,
        password: ctx.overrides.docker_password.clone(),
    });
    plan.docker_needs_update = true;
    Ok(plan)
}

pub fn set_droplet_path(mut plan: PushPlan, ctx: &BuildContext<'_>) -> Result<PushPlan, PushError> {
    plan.droplet_path = ctx.overrides.droplet_path.clone();
    Ok(plan)
}

/// Defaults to the working directory when nothing else names the source.
pub fn set_bits_path(mut plan: PushPlan, ctx: &BuildContext<'_>) -> Result<PushPlan, PushError> {
    if plan.droplet_path.is_some() || plan.docker.is_some() {
        return Ok(plan);
    }

    plan.bits_path = match (&ctx.overrides.provided_app_path, &ctx.manifest_app.path) {
        (Some(path), _) | (None, Some(path)) => Some(path.clone()),
        (None, None) => Some(std::env::current_dir()?),
    };
    Ok(plan)
}

pub fn set_all_resources(
    mut plan: PushPlan,
    ctx: &BuildContext<'_>,
) -> Result<PushPlan, PushError> {
    if plan.droplet_path.is_some() || plan.is_docker() {
        return Ok(plan);
    }

    let path = plan.bits_path.as_deref().ok_or(PushError::BitsPathUnset)?;
    let metadata = std::fs::metadata(path)?;

    plan.all_resources = if metadata.is_dir() {
        ctx.resources.gather_directory_resources(path)?
    } else {
        ctx.resources.gather_archive_resources(path)?
    };
    plan.is_archive = !metadata.is_dir();

    tracing::debug!(
        "{} resources for {} from {}",
        plan.all_resources.len(),
        plan.app_name(),
        path.display()
    );
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::super::tests::Unreachable;
    use super::*;
    use crate::config::{DockerConfig, FlagOverrides, ManifestApplication};
    use crate::platform::LifecycleType;
    use crate::resources::{LocalResources, ResourceGatherer};
    use crate::types::AppName;
    use std::path::PathBuf;

    fn app() -> ManifestApplication {
        ManifestApplication::named(AppName::new("web").unwrap())
    }

    #[test]
    fn docker_credentials_need_docker_lifecycle() {
        let overrides = FlagOverrides {
            docker_image: Some("nginx".into()),
            ..Default::default()
        };
        let manifest_app = app();
        let ctx = BuildContext {
            overrides: &overrides,
            manifest_app: &manifest_app,
            resources: &Unreachable,
        };

        let plan = set_docker_credentials(PushPlan::default(), &ctx).unwrap();
        assert!(plan.docker.is_none());
        assert!(!plan.docker_needs_update);

        let mut docker_plan = PushPlan::default();
        docker_plan.application.lifecycle = LifecycleType::Docker;
        let plan = set_docker_credentials(docker_plan, &ctx).unwrap();
        assert_eq!(plan.docker_image(), Some("nginx"));
        assert!(plan.docker_needs_update);
    }

    #[test]
    fn docker_username_falls_back_to_manifest() {
        let overrides = FlagOverrides {
            docker_password: Some("pw".into()),
            ..Default::default()
        };
        let manifest_app = ManifestApplication {
            docker: Some(DockerConfig {
                image: "private/app".into(),
                username: Some("deployer".into()),
            }),
            ..app()
        };
        let ctx = BuildContext {
            overrides: &overrides,
            manifest_app: &manifest_app,
            resources: &Unreachable,
        };
        let mut plan = PushPlan::default();
        plan.application.lifecycle = LifecycleType::Docker;

        let docker = set_docker_credentials(plan, &ctx).unwrap().docker.unwrap();
        assert_eq!(docker.username.as_deref(), Some("deployer"));
        assert_eq!(docker.password.as_deref(), Some("pw"));
    }

    #[test]
    fn bits_path_prefers_flag_then_manifest_then_cwd() {
        let manifest_app = ManifestApplication {
            path: Some(PathBuf::from("/srv/manifest-path")),
            ..app()
        };
        let flagged = FlagOverrides {
            provided_app_path: Some(PathBuf::from("/srv/flag-path")),
            ..Default::default()
        };
        let none = FlagOverrides::default();

        let with_flag = BuildContext {
            overrides: &flagged,
            manifest_app: &manifest_app,
            resources: &Unreachable,
        };
        let plan = set_bits_path(PushPlan::default(), &with_flag).unwrap();
        assert_eq!(plan.bits_path, Some(PathBuf::from("/srv/flag-path")));

        let from_manifest = BuildContext {
            overrides: &none,
            manifest_app: &manifest_app,
            resources: &Unreachable,
        };
        let plan = set_bits_path(PushPlan::default(), &from_manifest).unwrap();
        assert_eq!(plan.bits_path, Some(PathBuf::from("/srv/manifest-path")));

        let bare = app();
        let from_cwd = BuildContext {
            overrides: &none,
            manifest_app: &bare,
            resources: &Unreachable,
        };
        let plan = set_bits_path(PushPlan::default(), &from_cwd).unwrap();
        assert_eq!(plan.bits_path, Some(std::env::current_dir().unwrap()));
    }

    #[test]
    fn droplet_push_has_no_bits_path() {
        let overrides = FlagOverrides {
            droplet_path: Some(PathBuf::from("/tmp/droplet.tgz")),
            ..Default::default()
        };
        let manifest_app = app();
        let ctx = BuildContext {
            overrides: &overrides,
            manifest_app: &manifest_app,
            resources: &Unreachable,
        };

        let plan = set_droplet_path(PushPlan::default(), &ctx).unwrap();
        let plan = set_bits_path(plan, &ctx).unwrap();
        let plan = set_all_resources(plan, &ctx).unwrap();

        assert!(plan.bits_path.is_none());
        assert!(plan.all_resources.is_empty());
    }

    #[test]
    fn missing_bits_path_is_a_developer_error() {
        let overrides = FlagOverrides::default();
        let manifest_app = app();
        let ctx = BuildContext {
            overrides: &overrides,
            manifest_app: &manifest_app,
            resources: &Unreachable,
        };

        let err = set_all_resources(PushPlan::default(), &ctx).unwrap_err();
        assert!(matches!(err, PushError::BitsPathUnset));
    }

    #[test]
    fn directory_and_archive_resources() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>hi</h1>").unwrap();

        let overrides = FlagOverrides::default();
        let manifest_app = app();
        let gatherer = LocalResources::new();
        let ctx = BuildContext {
            overrides: &overrides,
            manifest_app: &manifest_app,
            resources: &gatherer,
        };

        let mut plan = PushPlan::default();
        plan.bits_path = Some(dir.path().to_path_buf());
        let plan = set_all_resources(plan, &ctx).unwrap();
        assert!(!plan.is_archive);
        assert_eq!(plan.all_resources.len(), 1);

        let archive = gatherer
            .zip_directory_resources(dir.path(), &plan.all_resources)
            .unwrap();
        let mut zipped = PushPlan::default();
        zipped.bits_path = Some(archive.clone());
        let zipped = set_all_resources(zipped, &ctx).unwrap();
        std::fs::remove_file(&archive).unwrap();

        assert!(zipped.is_archive);
        assert_eq!(zipped.all_resources, plan.all_resources);
    }

    #[test]
    fn unreadable_bits_path_is_an_io_error() {
        let overrides = FlagOverrides::default();
        let manifest_app = app();
        let ctx = BuildContext {
            overrides: &overrides,
            manifest_app: &manifest_app,
            resources: &Unreachable,
        };
        let mut plan = PushPlan::default();
        plan.bits_path = Some(PathBuf::from("/definitely/not/here"));

        let err = set_all_resources(plan, &ctx).unwrap_err();
        assert!(matches!(err, PushError::Io(_)));
    }
}

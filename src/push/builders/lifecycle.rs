// ABOUTME: Builders for application identity, deployment strategy and start flags.
// ABOUTME: Flags win over manifest values wherever both are given.

use crate::platform::{DeploymentOptions, LifecycleType};
use crate::push::{PushError, PushPlan};

use super::BuildContext;

pub fn set_application(mut plan: PushPlan, ctx: &BuildContext<'_>) -> Result<PushPlan, PushError> {
    let app = &mut plan.application;
    app.name = ctx.manifest_app.name.clone();

    let docker_image = ctx
        .overrides
        .docker_image
        .as_deref()
        .or(ctx.manifest_app.docker_image());
    if docker_image.is_some() {
        app.lifecycle = LifecycleType::Docker;
    }

    app.buildpacks = if ctx.overrides.buildpacks.is_empty() {
        ctx.manifest_app.buildpacks.clone()
    } else {
        ctx.overrides.buildpacks.clone()
    };
    app.stack = ctx
        .overrides
        .stack
        .clone()
        .or_else(|| ctx.manifest_app.stack.clone());

    plan.application_needs_update =
        !plan.application.buildpacks.is_empty() || plan.application.stack.is_some();
    Ok(plan)
}

pub fn set_deployment_strategy(
    mut plan: PushPlan,
    ctx: &BuildContext<'_>,
) -> Result<PushPlan, PushError> {
    let overrides = ctx.overrides;
    plan.strategy = overrides.strategy;
    if !plan.strategy.creates_deployment() {
        return Ok(plan);
    }

    let manifest = ctx.manifest_app;
    plan.deployment = DeploymentOptions {
        max_in_flight: overrides.max_in_flight,
        canary_steps: overrides.instance_steps.clone(),
        instances: overrides.instances.or(manifest.instances),
        memory: overrides.memory.or(manifest.memory),
        disk: overrides.disk.or(manifest.disk_quota),
        log_rate_limit: overrides
            .log_rate_limit
            .or(manifest.log_rate_limit_per_second),
    };
    Ok(plan)
}

pub fn set_task(mut plan: PushPlan, ctx: &BuildContext<'_>) -> Result<PushPlan, PushError> {
    plan.task = ctx.overrides.task || ctx.manifest_app.is_task();
    Ok(plan)
}

pub fn set_no_start(mut plan: PushPlan, ctx: &BuildContext<'_>) -> Result<PushPlan, PushError> {
    if ctx.overrides.no_start {
        plan.no_start = true;
    }
    Ok(plan)
}

pub fn set_no_wait(mut plan: PushPlan, ctx: &BuildContext<'_>) -> Result<PushPlan, PushError> {
    if ctx.overrides.no_wait {
        plan.no_wait = true;
    }
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::super::tests::Unreachable;
    use super::*;
    use crate::config::{
        DeploymentStrategy, DockerConfig, FlagOverrides, ManifestApplication, Megabytes,
    };
    use crate::types::AppName;

    fn manifest_app() -> ManifestApplication {
        ManifestApplication {
            buildpacks: vec!["ruby_buildpack".into()],
            instances: Some(2),
            memory: Some(Megabytes(512)),
            ..ManifestApplication::named(AppName::new("web").unwrap())
        }
    }

    fn run(
        builder: fn(PushPlan, &BuildContext<'_>) -> Result<PushPlan, PushError>,
        overrides: &FlagOverrides,
        manifest_app: &ManifestApplication,
    ) -> PushPlan {
        let ctx = BuildContext {
            overrides,
            manifest_app,
            resources: &Unreachable,
        };
        builder(PushPlan::default(), &ctx).unwrap()
    }

    #[test]
    fn flag_buildpacks_replace_manifest_buildpacks() {
        let overrides = FlagOverrides {
            buildpacks: vec!["go_buildpack".into()],
            ..Default::default()
        };
        let plan = run(set_application, &overrides, &manifest_app());

        assert_eq!(plan.application.buildpacks, ["go_buildpack"]);
        assert!(plan.application_needs_update);
        assert_eq!(plan.application.lifecycle, LifecycleType::Buildpack);
    }

    #[test]
    fn manifest_docker_image_selects_docker_lifecycle() {
        let app = ManifestApplication {
            docker: Some(DockerConfig {
                image: "nginx".into(),
                username: None,
            }),
            ..ManifestApplication::named(AppName::new("proxy").unwrap())
        };
        let plan = run(set_application, &FlagOverrides::default(), &app);

        assert_eq!(plan.application.lifecycle, LifecycleType::Docker);
        assert!(!plan.application_needs_update);
    }

    #[test]
    fn default_strategy_leaves_deployment_options_empty() {
        let plan = run(
            set_deployment_strategy,
            &FlagOverrides::default(),
            &manifest_app(),
        );
        assert_eq!(plan.strategy, DeploymentStrategy::Default);
        assert_eq!(plan.deployment, DeploymentOptions::default());
    }

    #[test]
    fn canary_carries_steps_and_manifest_scale() {
        let overrides = FlagOverrides {
            strategy: DeploymentStrategy::Canary,
            instance_steps: vec![10, 50],
            max_in_flight: Some(2),
            memory: Some(Megabytes(1024)),
            ..Default::default()
        };
        let plan = run(set_deployment_strategy, &overrides, &manifest_app());

        assert_eq!(plan.deployment.canary_steps, [10, 50]);
        assert_eq!(plan.deployment.max_in_flight, Some(2));
        assert_eq!(plan.deployment.instances, Some(2));
        assert_eq!(plan.deployment.memory, Some(Megabytes(1024)));
    }

    #[test]
    fn manifest_task_type_marks_plan_as_task() {
        let app = ManifestApplication {
            app_type: Some("task".into()),
            ..manifest_app()
        };
        let plan = run(set_task, &FlagOverrides::default(), &app);
        assert!(plan.task);
    }

    #[test]
    fn absent_flags_leave_plan_unchanged() {
        let overrides = FlagOverrides::default();
        let app = manifest_app();
        assert_eq!(run(set_no_start, &overrides, &app), PushPlan::default());
        assert_eq!(run(set_no_wait, &overrides, &app), PushPlan::default());
    }
}

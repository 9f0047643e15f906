// ABOUTME: Builders for web process scale, process configuration and routes.
// ABOUTME: Each sets a needs-update flag only when something was actually requested.

use crate::platform::{ProcessScale, ProcessUpdate};
use crate::push::{PushError, PushPlan};

use super::BuildContext;

/// Deployments carry scale in their request, so only plain pushes scale here.
pub fn set_scale(mut plan: PushPlan, ctx: &BuildContext<'_>) -> Result<PushPlan, PushError> {
    if plan.strategy.creates_deployment() {
        return Ok(plan);
    }

    let overrides = ctx.overrides;
    let manifest = ctx.manifest_app;
    let scale = ProcessScale {
        instances: overrides.instances.or(manifest.instances),
        memory: overrides.memory.or(manifest.memory),
        disk: overrides.disk.or(manifest.disk_quota),
        log_rate_limit: overrides
            .log_rate_limit
            .or(manifest.log_rate_limit_per_second),
    };

    if !scale.is_empty() {
        plan.scale = scale;
        plan.scale_needs_update = true;
    }
    Ok(plan)
}

pub fn set_process_configuration(
    mut plan: PushPlan,
    ctx: &BuildContext<'_>,
) -> Result<PushPlan, PushError> {
    let overrides = ctx.overrides;
    let manifest = ctx.manifest_app;
    let update = ProcessUpdate {
        health_check_type: overrides.health_check_type.or(manifest.health_check_type),
        health_check_endpoint: overrides
            .health_check_endpoint
            .clone()
            .or_else(|| manifest.health_check_http_endpoint.clone()),
        health_check_timeout: overrides.health_check_timeout.or(manifest.timeout),
        command: overrides
            .start_command
            .clone()
            .or_else(|| manifest.command.clone()),
    };

    if !update.is_empty() {
        plan.process_update = update;
        plan.process_needs_update = true;
    }
    Ok(plan)
}

/// `default-route` in the manifest overrides a random route request.
pub fn set_routes(mut plan: PushPlan, ctx: &BuildContext<'_>) -> Result<PushPlan, PushError> {
    plan.skip_route_creation = ctx.overrides.no_route || ctx.manifest_app.no_route;
    plan.random_route = (ctx.overrides.random_route || ctx.manifest_app.random_route)
        && !ctx.manifest_app.default_route;
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::super::tests::Unreachable;
    use super::*;
    use crate::config::{
        DeploymentStrategy, FlagOverrides, HealthCheckType, ManifestApplication, Megabytes,
    };
    use crate::types::AppName;

    fn app() -> ManifestApplication {
        ManifestApplication::named(AppName::new("web").unwrap())
    }

    fn build(
        builder: fn(PushPlan, &BuildContext<'_>) -> Result<PushPlan, PushError>,
        plan: PushPlan,
        overrides: &FlagOverrides,
        manifest_app: &ManifestApplication,
    ) -> PushPlan {
        let ctx = BuildContext {
            overrides,
            manifest_app,
            resources: &Unreachable,
        };
        builder(plan, &ctx).unwrap()
    }

    #[test]
    fn no_scale_requested_means_no_update() {
        let plan = build(set_scale, PushPlan::default(), &FlagOverrides::default(), &app());
        assert!(!plan.scale_needs_update);
        assert!(plan.scale.is_empty());
    }

    #[test]
    fn flag_instances_combine_with_manifest_memory() {
        let overrides = FlagOverrides {
            instances: Some(4),
            ..Default::default()
        };
        let manifest_app = ManifestApplication {
            memory: Some(Megabytes(256)),
            ..app()
        };
        let plan = build(set_scale, PushPlan::default(), &overrides, &manifest_app);

        assert!(plan.scale_needs_update);
        assert_eq!(plan.scale.instances, Some(4));
        assert_eq!(plan.scale.memory, Some(Megabytes(256)));
    }

    #[test]
    fn rolling_push_does_not_scale_separately() {
        let overrides = FlagOverrides {
            instances: Some(4),
            ..Default::default()
        };
        let mut plan = PushPlan::default();
        plan.strategy = DeploymentStrategy::Rolling;

        let plan = build(set_scale, plan, &overrides, &app());
        assert!(!plan.scale_needs_update);
    }

    #[test]
    fn process_configuration_from_manifest() {
        let manifest_app = ManifestApplication {
            health_check_type: Some(HealthCheckType::Http),
            health_check_http_endpoint: Some("/healthz".into()),
            ..app()
        };
        let overrides = FlagOverrides {
            start_command: Some("bin/server".into()),
            ..Default::default()
        };
        let plan = build(
            set_process_configuration,
            PushPlan::default(),
            &overrides,
            &manifest_app,
        );

        assert!(plan.process_needs_update);
        assert_eq!(
            plan.process_update.health_check_type,
            Some(HealthCheckType::Http)
        );
        assert_eq!(
            plan.process_update.health_check_endpoint.as_deref(),
            Some("/healthz")
        );
        assert_eq!(plan.process_update.command.as_deref(), Some("bin/server"));
    }

    #[test]
    fn route_flags() {
        let no_route = FlagOverrides {
            no_route: true,
            ..Default::default()
        };
        let plan = build(set_routes, PushPlan::default(), &no_route, &app());
        assert!(plan.skip_route_creation);

        let random = FlagOverrides {
            random_route: true,
            ..Default::default()
        };
        let plan = build(set_routes, PushPlan::default(), &random, &app());
        assert!(plan.random_route);

        let pinned = ManifestApplication {
            default_route: true,
            ..app()
        };
        let plan = build(set_routes, PushPlan::default(), &random, &pinned);
        assert!(!plan.random_route);
    }
}

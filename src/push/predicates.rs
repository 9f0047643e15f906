// ABOUTME: Pure conditions over a plan that decide which steps run.
// ABOUTME: Source predicates are mutually exclusive; exactly one holds per plan.

use super::PushPlan;

pub fn should_create_bits_package(plan: &PushPlan) -> bool {
    plan.droplet_path.is_none() && plan.docker.is_none()
}

pub fn should_create_docker_package(plan: &PushPlan) -> bool {
    plan.droplet_path.is_none() && plan.docker.is_some()
}

pub fn should_create_droplet(plan: &PushPlan) -> bool {
    plan.droplet_path.is_some()
}

pub fn should_stage_package(plan: &PushPlan) -> bool {
    !plan.no_start && plan.droplet_path.is_none()
}

/// Rolling and canary strategies both go through a platform deployment.
pub fn should_create_deployment(plan: &PushPlan) -> bool {
    plan.strategy.creates_deployment()
}

pub fn should_stop_application(plan: &PushPlan) -> bool {
    plan.no_start && plan.application.is_started()
}

pub fn should_set_droplet(plan: &PushPlan) -> bool {
    !plan.no_start || plan.droplet_path.is_some()
}

pub fn should_restart(plan: &PushPlan) -> bool {
    !plan.no_start
}

pub fn should_create_application(plan: &PushPlan) -> bool {
    !plan.application.exists()
}

pub fn should_update_application(plan: &PushPlan) -> bool {
    plan.application.exists() && plan.application_needs_update
}

fn routes_apply(plan: &PushPlan) -> bool {
    !plan.skip_route_creation && !plan.task
}

/// Routes for existing apps and deployments are settled before any bits move.
pub fn should_update_routes_before_source(plan: &PushPlan) -> bool {
    routes_apply(plan) && (plan.application.exists() || should_create_deployment(plan))
}

/// A brand new app gets its route once it has a droplet, just before it starts.
pub fn should_update_routes_before_restart(plan: &PushPlan) -> bool {
    routes_apply(plan) && !plan.application.exists() && !should_create_deployment(plan)
}

pub fn should_scale_web_process(plan: &PushPlan) -> bool {
    plan.scale_needs_update
}

pub fn should_update_web_process(plan: &PushPlan) -> bool {
    plan.process_needs_update
}

// ABOUTME: Assembles the ordered list of steps for a plan.
// ABOUTME: Pure and deterministic: equal plans always produce equal sequences.

use serde::Serialize;
use std::fmt;

use super::PushPlan;
use super::predicates::*;

/// One unit of pipeline work. The actor maps each kind to its handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Step {
    CreateApplication,
    UpdateApplication,
    UpdateRoutes,
    ScaleWebProcess,
    UpdateWebProcess,
    CreateBitsPackage,
    CreateDockerPackage,
    CreateDroplet,
    StagePackage,
    StopApplication,
    SetDroplet,
    RestartApplication,
    CreateDeployment,
}

impl Step {
    pub fn as_str(self) -> &'static str {
        match self {
            Step::CreateApplication => "create-application",
            Step::UpdateApplication => "update-application",
            Step::UpdateRoutes => "update-routes",
            Step::ScaleWebProcess => "scale-web-process",
            Step::UpdateWebProcess => "update-web-process",
            Step::CreateBitsPackage => "create-bits-package",
            Step::CreateDockerPackage => "create-docker-package",
            Step::CreateDroplet => "create-droplet",
            Step::StagePackage => "stage-package",
            Step::StopApplication => "stop-application",
            Step::SetDroplet => "set-droplet",
            Step::RestartApplication => "restart-application",
            Step::CreateDeployment => "create-deployment",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata, route, scale and process changes applied ahead of the source.
pub fn update_sequence(plan: &PushPlan) -> Vec<Step> {
    let mut steps = Vec::new();
    if should_update_application(plan) {
        steps.push(Step::UpdateApplication);
    }
    if should_update_routes_before_source(plan) {
        steps.push(Step::UpdateRoutes);
    }
    if should_scale_web_process(plan) {
        steps.push(Step::ScaleWebProcess);
    }
    if should_update_web_process(plan) {
        steps.push(Step::UpdateWebProcess);
    }
    steps
}

/// The single step that gets the application's code onto the platform.
pub fn source_sequence(plan: &PushPlan) -> Vec<Step> {
    if should_create_bits_package(plan) {
        vec![Step::CreateBitsPackage]
    } else if should_create_docker_package(plan) {
        vec![Step::CreateDockerPackage]
    } else if should_create_droplet(plan) {
        vec![Step::CreateDroplet]
    } else {
        Vec::new()
    }
}

/// Staging and the steps that put the new droplet into service.
pub fn runtime_sequence(plan: &PushPlan) -> Vec<Step> {
    // Tasks are stopped unconditionally, even if they never ran.
    if plan.task {
        return vec![Step::StagePackage, Step::StopApplication, Step::SetDroplet];
    }

    let mut steps = Vec::new();
    if should_stage_package(plan) {
        steps.push(Step::StagePackage);
    }

    if should_create_deployment(plan) {
        steps.push(Step::CreateDeployment);
        return steps;
    }

    if should_stop_application(plan) {
        steps.push(Step::StopApplication);
    }
    if should_set_droplet(plan) {
        steps.push(Step::SetDroplet);
    }
    if should_update_routes_before_restart(plan) {
        steps.push(Step::UpdateRoutes);
    }
    if should_restart(plan) {
        steps.push(Step::RestartApplication);
    }
    steps
}

/// The complete pipeline for a plan, in execution order.
pub fn full_sequence(plan: &PushPlan) -> Vec<Step> {
    let mut steps = Vec::new();
    if should_create_application(plan) {
        steps.push(Step::CreateApplication);
    }
    steps.extend(update_sequence(plan));
    steps.extend(source_sequence(plan));
    steps.extend(runtime_sequence(plan));

    tracing::debug!(
        "sequenced {} steps for {}: {:?}",
        steps.len(),
        plan.app_name(),
        steps
    );
    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeploymentStrategy;
    use crate::platform::{ApplicationState, DockerCredentials};
    use crate::types::AppGuid;
    use proptest::prelude::*;
    use std::path::PathBuf;

    prop_compose! {
        fn any_plan()(
            source in 0u8..3,
            exists in any::<bool>(),
            started in any::<bool>(),
            no_start in any::<bool>(),
            task in any::<bool>(),
            strategy in prop_oneof![
                Just(DeploymentStrategy::Default),
                Just(DeploymentStrategy::Rolling),
                Just(DeploymentStrategy::Canary),
            ],
            skip_route in any::<bool>(),
            needs_update in any::<bool>(),
            scale in any::<bool>(),
            process in any::<bool>(),
        ) -> PushPlan {
            let mut plan = PushPlan::default();
            match source {
                0 => plan.bits_path = Some(PathBuf::from("/app")),
                1 => plan.docker = Some(DockerCredentials { image: "nginx".into(), ..Default::default() }),
                _ => plan.droplet_path = Some(PathBuf::from("/droplet.tgz")),
            }
            if exists {
                plan.application.guid = AppGuid::new("app-1");
                if started {
                    plan.application.state = ApplicationState::Started;
                }
            }
            plan.no_start = no_start;
            plan.task = task;
            plan.strategy = strategy;
            plan.skip_route_creation = skip_route;
            plan.application_needs_update = needs_update;
            plan.scale_needs_update = scale;
            plan.process_needs_update = process;
            plan
        }
    }

    proptest! {
        #[test]
        fn sequencing_is_deterministic(plan in any_plan()) {
            let copy = plan.clone();
            prop_assert_eq!(full_sequence(&plan), full_sequence(&copy));
            prop_assert_eq!(runtime_sequence(&plan), runtime_sequence(&plan));
            prop_assert_eq!(source_sequence(&plan), source_sequence(&plan));
        }

        #[test]
        fn task_runtime_is_fixed(mut plan in any_plan()) {
            plan.task = true;
            prop_assert_eq!(
                runtime_sequence(&plan),
                vec![Step::StagePackage, Step::StopApplication, Step::SetDroplet]
            );
            prop_assert!(!full_sequence(&plan).contains(&Step::UpdateRoutes));
        }

        #[test]
        fn deployments_replace_stop_set_and_restart(mut plan in any_plan()) {
            plan.task = false;
            plan.strategy = DeploymentStrategy::Rolling;
            let steps = runtime_sequence(&plan);
            prop_assert_eq!(steps.last(), Some(&Step::CreateDeployment));
            for forbidden in [Step::StopApplication, Step::SetDroplet, Step::RestartApplication] {
                prop_assert!(!steps.contains(&forbidden));
            }
        }

        #[test]
        fn stop_set_restart_keep_relative_order(mut plan in any_plan()) {
            plan.task = false;
            plan.strategy = DeploymentStrategy::Default;
            let steps = runtime_sequence(&plan);
            let position = |step: Step| steps.iter().position(|s| *s == step);
            let ordered: Vec<_> = [Step::StopApplication, Step::SetDroplet, Step::RestartApplication]
                .into_iter()
                .filter_map(position)
                .collect();
            prop_assert!(ordered.windows(2).all(|w| w[0] < w[1]));
        }

        #[test]
        fn exactly_one_source_step(plan in any_plan()) {
            prop_assert_eq!(source_sequence(&plan).len(), 1);
        }

        #[test]
        fn routes_appear_at_most_once(plan in any_plan()) {
            let count = full_sequence(&plan).iter().filter(|s| **s == Step::UpdateRoutes).count();
            prop_assert!(count <= 1);
        }
    }

    #[test]
    fn new_buildpack_app_pipeline() {
        let mut plan = PushPlan::default();
        plan.bits_path = Some(PathBuf::from("/app"));

        assert_eq!(
            full_sequence(&plan),
            [
                Step::CreateApplication,
                Step::CreateBitsPackage,
                Step::StagePackage,
                Step::SetDroplet,
                Step::UpdateRoutes,
                Step::RestartApplication,
            ]
        );
    }

    #[test]
    fn existing_app_updates_before_source() {
        let mut plan = PushPlan::default();
        plan.application.guid = AppGuid::new("app-1");
        plan.application_needs_update = true;
        plan.scale_needs_update = true;
        plan.process_needs_update = true;
        plan.bits_path = Some(PathBuf::from("/app"));

        assert_eq!(
            update_sequence(&plan),
            [
                Step::UpdateApplication,
                Step::UpdateRoutes,
                Step::ScaleWebProcess,
                Step::UpdateWebProcess,
            ]
        );
    }

    #[test]
    fn no_start_on_running_app_stops_without_restart() {
        let mut plan = PushPlan::default();
        plan.application.guid = AppGuid::new("app-1");
        plan.application.state = ApplicationState::Started;
        plan.no_start = true;

        assert_eq!(runtime_sequence(&plan), [Step::StopApplication]);
    }

    #[test]
    fn task_stops_even_when_never_started() {
        let mut plan = PushPlan::default();
        plan.task = true;
        plan.no_start = true;

        assert!(!plan.application.is_started());
        assert_eq!(
            runtime_sequence(&plan),
            [Step::StagePackage, Step::StopApplication, Step::SetDroplet]
        );
    }

    #[test]
    fn droplet_push_skips_staging() {
        let mut plan = PushPlan::default();
        plan.application.guid = AppGuid::new("app-1");
        plan.droplet_path = Some(PathBuf::from("/droplet.tgz"));
        plan.skip_route_creation = true;

        assert_eq!(
            full_sequence(&plan),
            [Step::CreateDroplet, Step::SetDroplet, Step::RestartApplication]
        );
    }

    #[test]
    fn step_names_are_kebab_case() {
        assert_eq!(Step::CreateBitsPackage.to_string(), "create-bits-package");
        assert_eq!(
            serde_json::to_string(&Step::RestartApplication).unwrap(),
            "\"restart-application\""
        );
    }
}

// ABOUTME: Step handlers and the dispatcher that runs one step against a plan.
// ABOUTME: A failed step hands back the plan it was given, untouched.

mod application;
mod bits;
mod deployment;
mod docker;
mod droplet;
mod process;
mod routes;
mod runtime;
mod staging;
mod upload;

use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::platform::{ApiError, InstanceDetailsSender, Outcome, Platform};
use crate::resources::ResourceGatherer;
use crate::warnings::Warnings;

use super::event::{Event, EventSink};
use super::progress::ProgressBar;
use super::sequence::Step;
use super::{PushActor, PushError, PushPlan};

/// A step succeeded; carries the updated plan.
#[derive(Debug)]
pub struct Advanced {
    pub plan: PushPlan,
    pub warnings: Warnings,
}

/// A step failed; carries the plan exactly as it was before the step.
#[derive(Debug)]
pub struct Halted {
    pub plan: PushPlan,
    pub warnings: Warnings,
    pub error: PushError,
}

pub type StepResult = Result<Advanced, Halted>;

/// Per-step collaborators and the warnings gathered so far.
pub(crate) struct StepContext<'a> {
    events: &'a EventSink,
    progress: &'a dyn ProgressBar,
    warnings: Warnings,
}

impl StepContext<'_> {
    async fn emit(&self, event: Event) {
        self.events.emit(event).await;
    }

    fn collect<T>(&mut self, outcome: Outcome<T>) -> Result<T, ApiError> {
        outcome.collect(&mut self.warnings)
    }

    /// Await a platform poll, relaying instance status as events.
    ///
    /// Gives up with `on_timeout` once `limit` has passed.
    async fn poll_with_details<F, Fut>(
        &mut self,
        limit: Duration,
        on_timeout: ApiError,
        poll: F,
    ) -> Result<(), PushError>
    where
        F: FnOnce(InstanceDetailsSender) -> Fut,
        Fut: Future<Output = Outcome<()>>,
    {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let poll = tokio::time::timeout(limit, poll(tx));
        tokio::pin!(poll);

        let finished = loop {
            tokio::select! {
                biased;
                Some(details) = rx.recv() => self.emit(Event::InstanceDetails(details)).await,
                finished = &mut poll => break finished,
            }
        };

        while let Ok(details) = rx.try_recv() {
            self.emit(Event::InstanceDetails(details)).await;
        }

        match finished {
            Ok(outcome) => Ok(self.collect(outcome)?),
            Err(_) => Err(on_timeout.into()),
        }
    }
}

impl<P, R> PushActor<P, R>
where
    P: Platform + 'static,
    R: ResourceGatherer + 'static,
{
    /// Run a single step.
    ///
    /// On failure the returned plan is the input plan; events already
    /// emitted and warnings already collected still stand.
    pub async fn run_step(
        &self,
        step: Step,
        plan: PushPlan,
        events: &EventSink,
        progress: &dyn ProgressBar,
    ) -> StepResult {
        let mut ctx = StepContext {
            events,
            progress,
            warnings: Warnings::new(),
        };

        tracing::info!("{}: {}", plan.app_name(), step);
        let result = match step {
            Step::CreateApplication => self.create_application(&plan, &mut ctx).await,
            Step::UpdateApplication => self.update_application(&plan, &mut ctx).await,
            Step::UpdateRoutes => self.update_routes(&plan, &mut ctx).await,
            Step::ScaleWebProcess => self.scale_web_process(&plan, &mut ctx).await,
            Step::UpdateWebProcess => self.update_web_process(&plan, &mut ctx).await,
            Step::CreateBitsPackage => self.create_bits_package(&plan, &mut ctx).await,
            Step::CreateDockerPackage => self.create_docker_package(&plan, &mut ctx).await,
            Step::CreateDroplet => self.create_droplet(&plan, &mut ctx).await,
            Step::StagePackage => self.stage_package(&plan, &mut ctx).await,
            Step::StopApplication => self.stop_application(&plan, &mut ctx).await,
            Step::SetDroplet => self.set_droplet(&plan, &mut ctx).await,
            Step::RestartApplication => self.restart_application(&plan, &mut ctx).await,
            Step::CreateDeployment => self.create_deployment(&plan, &mut ctx).await,
        };

        match result {
            Ok(next) => Ok(Advanced {
                plan: next,
                warnings: ctx.warnings,
            }),
            Err(error) => Err(Halted {
                plan,
                warnings: ctx.warnings,
                error,
            }),
        }
    }
}

// ABOUTME: Step that replaces the running droplet through a rolling or canary deployment.
// ABOUTME: The platform swaps instances itself; the step only starts and watches it.

use crate::platform::{ApiError, ApplicationState, DeploymentRequest, Platform};
use crate::push::event::Event;
use crate::push::{PushActor, PushError, PushPlan};
use crate::resources::ResourceGatherer;

use super::StepContext;

impl<P, R> PushActor<P, R>
where
    P: Platform + 'static,
    R: ResourceGatherer + 'static,
{
    pub(super) async fn create_deployment(
        &self,
        plan: &PushPlan,
        ctx: &mut StepContext<'_>,
    ) -> Result<PushPlan, PushError> {
        let app = &plan.application;
        let request = DeploymentRequest {
            app: app.guid.clone(),
            droplet: plan.droplet_guid.clone(),
            strategy: plan.strategy,
            options: plan.deployment.clone(),
        };

        ctx.emit(Event::StartingDeployment).await;
        let outcome = self.platform.create_deployment(&request).await;
        let deployment = ctx.collect(outcome)?;
        tracing::info!("{} deployment {} started", plan.strategy, deployment);

        ctx.emit(Event::WaitingForDeployment).await;
        let limit = self.config.startup_timeout;
        ctx.poll_with_details(
            limit,
            ApiError::StartupTimeout(limit.as_secs()),
            |details| {
                self.platform
                    .poll_deployment(app, &deployment, plan.no_wait, details)
            },
        )
        .await?;

        let mut next = plan.clone();
        next.application.state = ApplicationState::Started;
        Ok(next)
    }
}

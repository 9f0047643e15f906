// ABOUTME: Steps that stop the app, swap its droplet and restart it.
// ABOUTME: Restart waits for instances, relaying their status until startup or timeout.

use crate::platform::{ApiError, ApplicationState, Platform};
use crate::push::event::Event;
use crate::push::{PushActor, PushError, PushPlan};
use crate::resources::ResourceGatherer;

use super::StepContext;

impl<P, R> PushActor<P, R>
where
    P: Platform + 'static,
    R: ResourceGatherer + 'static,
{
    pub(super) async fn stop_application(
        &self,
        plan: &PushPlan,
        ctx: &mut StepContext<'_>,
    ) -> Result<PushPlan, PushError> {
        ctx.emit(Event::StoppingApplication).await;
        let outcome = self
            .platform
            .stop_application(&plan.application.guid)
            .await;
        ctx.collect(outcome)?;
        ctx.emit(Event::StoppingApplicationComplete).await;

        let mut next = plan.clone();
        next.application.state = ApplicationState::Stopped;
        Ok(next)
    }

    pub(super) async fn set_droplet(
        &self,
        plan: &PushPlan,
        ctx: &mut StepContext<'_>,
    ) -> Result<PushPlan, PushError> {
        ctx.emit(Event::SettingDroplet).await;
        let outcome = self
            .platform
            .set_application_droplet(&plan.application.guid, &plan.droplet_guid)
            .await;
        ctx.collect(outcome)?;
        ctx.emit(Event::SetDropletComplete).await;
        Ok(plan.clone())
    }

    pub(super) async fn restart_application(
        &self,
        plan: &PushPlan,
        ctx: &mut StepContext<'_>,
    ) -> Result<PushPlan, PushError> {
        let app = &plan.application;

        ctx.emit(Event::RestartingApplication).await;
        let outcome = self
            .platform
            .restart_application(&app.guid, plan.no_wait)
            .await;
        ctx.collect(outcome)?;

        let limit = self.config.startup_timeout;
        ctx.poll_with_details(
            limit,
            ApiError::StartupTimeout(limit.as_secs()),
            |details| self.platform.poll_start(app, plan.no_wait, details),
        )
        .await?;
        ctx.emit(Event::RestartingApplicationComplete).await;

        let mut next = plan.clone();
        next.application.state = ApplicationState::Started;
        Ok(next)
    }
}

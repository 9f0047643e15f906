// ABOUTME: Step that stages the package into a droplet.
// ABOUTME: Skipped when the user supplied a droplet directly.

use crate::platform::{ApiError, Platform};
use crate::push::event::Event;
use crate::push::{PushActor, PushError, PushPlan};
use crate::resources::ResourceGatherer;

use super::StepContext;

impl<P, R> PushActor<P, R>
where
    P: Platform + 'static,
    R: ResourceGatherer + 'static,
{
    pub(super) async fn stage_package(
        &self,
        plan: &PushPlan,
        ctx: &mut StepContext<'_>,
    ) -> Result<PushPlan, PushError> {
        if plan.droplet_path.is_some() {
            return Ok(plan.clone());
        }

        ctx.emit(Event::StartingStaging).await;
        let outcome = self.platform.stage_package(&plan.package_guid).await;
        let build = ctx.collect(outcome)?;

        ctx.emit(Event::PollingBuild).await;
        let limit = self.config.staging_timeout;
        let polled = tokio::time::timeout(
            limit,
            self.platform.poll_build(&build.guid, plan.app_name()),
        )
        .await
        .map_err(|_| ApiError::StagingTimeout(limit.as_secs()))?;
        let droplet = ctx.collect(polled)?;

        let mut next = plan.clone();
        next.droplet_guid = droplet.guid;
        ctx.emit(Event::StagingComplete).await;
        Ok(next)
    }
}

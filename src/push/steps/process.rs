// ABOUTME: Steps that scale and configure the web process.
// ABOUTME: Only the web process is touched; other process types keep their settings.

use crate::platform::Platform;
use crate::push::event::Event;
use crate::push::{PushActor, PushError, PushPlan};
use crate::resources::ResourceGatherer;

use super::StepContext;

impl<P, R> PushActor<P, R>
where
    P: Platform + 'static,
    R: ResourceGatherer + 'static,
{
    pub(super) async fn scale_web_process(
        &self,
        plan: &PushPlan,
        ctx: &mut StepContext<'_>,
    ) -> Result<PushPlan, PushError> {
        ctx.emit(Event::ScaleWebProcess).await;
        let outcome = self
            .platform
            .scale_web_process(&plan.application.guid, &plan.scale)
            .await;
        ctx.collect(outcome)?;
        ctx.emit(Event::ScaleWebProcessComplete).await;
        Ok(plan.clone())
    }

    pub(super) async fn update_web_process(
        &self,
        plan: &PushPlan,
        ctx: &mut StepContext<'_>,
    ) -> Result<PushPlan, PushError> {
        ctx.emit(Event::SetProcessConfiguration).await;
        let outcome = self
            .platform
            .update_web_process(&plan.application.guid, &plan.process_update)
            .await;
        ctx.collect(outcome)?;
        ctx.emit(Event::SetProcessConfigurationComplete).await;
        Ok(plan.clone())
    }
}

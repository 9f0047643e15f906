// ABOUTME: Steps that create or update the application record.
// ABOUTME: Creation tolerates an application that appeared since resolution.

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
    pub(super) async fn create_application(
        &self,
        plan: &PushPlan,
        ctx: &mut StepContext<'_>,
    ) -> Result<PushPlan, PushError> {
        ctx.emit(Event::CreatingApplication).await;
        let outcome = self
            .platform
            .create_application(&plan.application, &plan.space_guid)
            .await;

        let created = match ctx.collect(outcome) {
            Ok(app) => {
                ctx.emit(Event::CreatedApplication).await;
                app
            }
            Err(ApiError::ApplicationAlreadyExists(_)) => {
                let existing = self
                    .platform
                    .get_application_by_name(plan.app_name(), &plan.space_guid)
                    .await;
                let app = ctx.collect(existing)?;
                ctx.emit(Event::ApplicationAlreadyExists).await;
                app
            }
            Err(err) => return Err(err.into()),
        };

        let mut next = plan.clone();
        next.application.guid = created.guid;
        next.application.state = created.state;
        Ok(next)
    }

    pub(super) async fn update_application(
        &self,
        plan: &PushPlan,
        ctx: &mut StepContext<'_>,
    ) -> Result<PushPlan, PushError> {
        ctx.emit(Event::UpdatingApplication).await;
        let outcome = self.platform.update_application(&plan.application).await;
        let updated = ctx.collect(outcome)?;
        ctx.emit(Event::UpdatedApplication).await;

        let mut next = plan.clone();
        next.application.buildpacks = updated.buildpacks;
        next.application.stack = updated.stack;
        next.application.state = updated.state;
        Ok(next)
    }
}

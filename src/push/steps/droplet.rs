// ABOUTME: Step that uploads a prebuilt droplet instead of staging one.
// ABOUTME: Staging is skipped for these pushes, the uploaded droplet is used as is.

use crate::platform::Platform;
use crate::push::event::Event;
use crate::push::{PushActor, PushError, PushPlan};
use crate::resources::ResourceGatherer;

use super::StepContext;
use super::upload::UploadTarget;

impl<P, R> PushActor<P, R>
where
    P: Platform + 'static,
    R: ResourceGatherer + 'static,
{
    pub(super) async fn create_droplet(
        &self,
        plan: &PushPlan,
        ctx: &mut StepContext<'_>,
    ) -> Result<PushPlan, PushError> {
        let Some(path) = plan.droplet_path.as_deref() else {
            return Err(PushError::Internal(
                "droplet step sequenced without a droplet path".to_string(),
            ));
        };

        ctx.emit(Event::CreatingDroplet).await;
        let outcome = self.platform.create_droplet(&plan.application.guid).await;
        let droplet = ctx.collect(outcome)?;

        let target = UploadTarget::Droplet {
            droplet: &droplet.guid,
            app: &plan.application.guid,
        };
        self.upload_with_retry(path, target, ctx).await?;

        let mut next = plan.clone();
        next.droplet_guid = droplet.guid;
        Ok(next)
    }
}

// ABOUTME: Step that creates a docker image package.
// ABOUTME: The image is referenced by the package; nothing is uploaded.

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
    pub(super) async fn create_docker_package(
        &self,
        plan: &PushPlan,
        ctx: &mut StepContext<'_>,
    ) -> Result<PushPlan, PushError> {
        let Some(credentials) = plan.docker.as_ref() else {
            return Err(PushError::Internal(
                "docker step sequenced without an image".to_string(),
            ));
        };

        ctx.emit(Event::SetDockerImage).await;
        let outcome = self
            .platform
            .create_docker_package(&plan.application.guid, credentials)
            .await;
        let package = ctx.collect(outcome)?;
        ctx.emit(Event::SetDockerImageComplete).await;

        let polled = self.poll_package(&package, ctx).await?;

        let mut next = plan.clone();
        next.package_guid = polled.guid;
        Ok(next)
    }
}

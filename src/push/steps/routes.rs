// ABOUTME: Step that creates and maps the application's route.
// ABOUTME: Looks a route up first and only creates it when the lookup finds nothing.

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
    pub(super) async fn update_routes(
        &self,
        plan: &PushPlan,
        ctx: &mut StepContext<'_>,
    ) -> Result<PushPlan, PushError> {
        let app = &plan.application;
        let mut next = plan.clone();

        let existing = self.platform.get_application_routes(&app.guid).await;
        next.application_routes = ctx.collect(existing)?;
        if !next.application_routes.is_empty() && !plan.random_route {
            tracing::debug!("{} already has routes", app.name);
            return Ok(next);
        }

        ctx.emit(Event::CreatingAndMappingRoutes).await;

        let domain = self.platform.get_default_domain(&plan.org_guid).await;
        let domain = ctx.collect(domain)?;

        let host = if plan.random_route {
            format!(
                "{}-{}-{}",
                app.name.hostname(),
                self.words.adjective(),
                self.words.noun()
            )
        } else {
            app.name.hostname()
        };

        let lookup = self.platform.get_route(&domain, &host, "").await;
        let route = match ctx.collect(lookup) {
            Ok(route) => route,
            Err(ApiError::RouteNotFound(_)) => {
                let created = self
                    .platform
                    .create_route(&plan.space_guid, &domain, &host, "")
                    .await;
                ctx.collect(created)?
            }
            Err(err) => return Err(err.into()),
        };

        let mapped = self.platform.map_route(&route.guid, &app.guid).await;
        ctx.collect(mapped)?;
        tracing::info!("mapped {} to {}", route, app.name);

        next.application_routes.push(route);
        ctx.emit(Event::CreatedRoutes).await;
        Ok(next)
    }
}

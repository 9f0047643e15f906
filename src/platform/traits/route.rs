// ABOUTME: Route and domain operations on the remote platform.
// ABOUTME: Default domain lookup, route lookup/creation and mapping.

use async_trait::async_trait;

use crate::platform::{Domain, Outcome, Route};
use crate::types::{AppGuid, OrgGuid, RouteGuid, SpaceGuid};

#[async_trait]
pub trait RouteOps: Send + Sync {
    async fn get_default_domain(&self, org: &OrgGuid) -> Outcome<Domain>;

    async fn get_application_routes(&self, app: &AppGuid) -> Outcome<Vec<Route>>;

    /// Find a route. Fails with `RouteNotFound`.
    async fn get_route(&self, domain: &Domain, host: &str, path: &str) -> Outcome<Route>;

    async fn create_route(
        &self,
        space: &SpaceGuid,
        domain: &Domain,
        host: &str,
        path: &str,
    ) -> Outcome<Route>;

    async fn map_route(&self, route: &RouteGuid, app: &AppGuid) -> Outcome<()>;
}

// ABOUTME: Type-safe identifiers and validated domain types.
// ABOUTME: Uses phantom types to prevent GUID confusion at compile time.

mod app_name;
mod id;

pub use app_name::{AppName, AppNameError};
pub use id::{
    AppGuid, BuildGuid, DeploymentGuid, DomainGuid, DropletGuid, Guid, OrgGuid, PackageGuid,
    RouteGuid, SpaceGuid,
};

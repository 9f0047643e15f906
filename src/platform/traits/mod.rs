// ABOUTME: Composable capability traits for the remote platform.
// ABOUTME: One trait per capability, joined by the Platform umbrella trait.

mod app;
mod deployment;
mod droplet;
mod package;
mod process;
mod route;
mod space;

pub use app::AppOps;
pub use deployment::DeploymentOps;
pub use droplet::DropletOps;
pub use package::PackageOps;
pub use process::ProcessOps;
pub use route::RouteOps;
pub use space::SpaceOps;

/// Channel on which pollers report free-text instance status as it changes.
pub type InstanceDetailsSender = tokio::sync::mpsc::UnboundedSender<String>;

/// Everything the push engine needs from the platform.
///
/// Automatically implemented for any type providing every capability.
pub trait Platform:
    AppOps + PackageOps + DropletOps + ProcessOps + RouteOps + DeploymentOps + SpaceOps
{
}

impl<T> Platform for T where
    T: AppOps + PackageOps + DropletOps + ProcessOps + RouteOps + DeploymentOps + SpaceOps
{
}

// ABOUTME: Abstraction over the remote application platform.
// ABOUTME: Capability traits, wire-agnostic records, errors and an in-memory implementation.

mod error;
mod memory;
mod outcome;
pub mod traits;
mod types;

pub use error::ApiError;
pub use memory::{InMemoryPlatform, Operation, UploadRecord};
pub use outcome::Outcome;
pub use traits::{
    AppOps, DeploymentOps, DropletOps, InstanceDetailsSender, PackageOps, Platform, ProcessOps,
    RouteOps, SpaceOps,
};
pub use types::{
    Application, ApplicationState, ArchiveUpload, Build, DeploymentOptions, DeploymentRequest,
    DockerCredentials, Domain, Droplet, LifecycleType, Package, PackageState, ProcessScale,
    ProcessUpdate, Route,
};

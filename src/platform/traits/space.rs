// ABOUTME: Space-level operations on the remote platform.
// ABOUTME: Applies a whole manifest to a space in one call.

use async_trait::async_trait;

use crate::platform::Outcome;
use crate::types::SpaceGuid;

#[async_trait]
pub trait SpaceOps: Send + Sync {
    /// Apply `manifest` (YAML) to `space`, creating or updating every
    /// application it lists.
    async fn set_space_manifest(&self, space: &SpaceGuid, manifest: &[u8]) -> Outcome<()>;
}

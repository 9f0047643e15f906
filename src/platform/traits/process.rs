// ABOUTME: Web process operations on the remote platform.
// ABOUTME: Scaling and health check / start command configuration.

use async_trait::async_trait;

use crate::platform::{Outcome, ProcessScale, ProcessUpdate};
use crate::types::AppGuid;

#[async_trait]
pub trait ProcessOps: Send + Sync {
    async fn scale_web_process(&self, app: &AppGuid, scale: &ProcessScale) -> Outcome<()>;

    async fn update_web_process(&self, app: &AppGuid, update: &ProcessUpdate) -> Outcome<()>;
}

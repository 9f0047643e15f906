// ABOUTME: Entry points of the push engine: plan creation, resolution and actualization.
// ABOUTME: Actualization runs on a background task and reports through an event stream.

use std::sync::Arc;

use crate::config::{FlagOverrides, Manifest, PushConfig};
use crate::platform::{ApiError, Platform};
use crate::resources::ResourceGatherer;
use crate::types::{OrgGuid, SpaceGuid};
use crate::warnings::Warnings;

use super::event::{self, EventStream};
use super::progress::ProgressBar;
use super::words::{RandomWords, WordList};
use super::{PushError, PushPlan, builders};

/// Drives push plans against a platform.
pub struct PushActor<P, R> {
    pub(super) platform: Arc<P>,
    pub(super) resources: Arc<R>,
    pub(super) config: PushConfig,
    pub(super) words: Arc<dyn RandomWords>,
}

impl<P, R> Clone for PushActor<P, R> {
    fn clone(&self) -> Self {
        Self {
            platform: Arc::clone(&self.platform),
            resources: Arc::clone(&self.resources),
            config: self.config.clone(),
            words: Arc::clone(&self.words),
        }
    }
}

impl<P, R> PushActor<P, R>
where
    P: Platform + 'static,
    R: ResourceGatherer + 'static,
{
    pub fn new(platform: Arc<P>, resources: Arc<R>) -> Self {
        Self {
            platform,
            resources,
            config: PushConfig::default(),
            words: Arc::new(WordList::new()),
        }
    }

    pub fn with_config(mut self, config: PushConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_words(mut self, words: Arc<dyn RandomWords>) -> Self {
        self.words = words;
        self
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn config(&self) -> &PushConfig {
        &self.config
    }

    /// Build plans for the applications being pushed. No remote calls.
    pub fn create_push_plans(
        &self,
        app_name: Option<&str>,
        space: &SpaceGuid,
        org: &OrgGuid,
        manifest: &Manifest,
        overrides: &FlagOverrides,
    ) -> Result<Vec<PushPlan>, PushError> {
        builders::create_push_plans(
            app_name,
            space,
            org,
            manifest,
            overrides,
            self.resources.as_ref(),
        )
    }

    /// Fill in GUID and state for applications that already exist.
    ///
    /// Missing applications are left for the pipeline to create. Warnings
    /// land in `warnings` whether or not resolution succeeds.
    pub async fn resolve_applications(
        &self,
        plans: Vec<PushPlan>,
        warnings: &mut Warnings,
    ) -> Result<Vec<PushPlan>, PushError> {
        let mut resolved = Vec::with_capacity(plans.len());

        for mut plan in plans {
            let outcome = self
                .platform
                .get_application_by_name(plan.app_name(), &plan.space_guid)
                .await;

            match outcome.collect(warnings) {
                Ok(remote) => {
                    tracing::debug!("{} exists as {}", plan.app_name(), remote.guid);
                    plan.application.guid = remote.guid;
                    plan.application.state = remote.state;
                }
                Err(ApiError::ApplicationNotFound(_)) => {
                    tracing::debug!("{} does not exist yet", plan.app_name());
                }
                Err(err) => return Err(err.into()),
            }
            resolved.push(plan);
        }

        Ok(resolved)
    }

    /// Run `plan` through its step sequence on a background task.
    ///
    /// The returned stream yields progress until the run completes or
    /// fails, then ends. It must be drained for the run to make progress.
    pub fn actualize(&self, plan: PushPlan, progress: Arc<dyn ProgressBar>) -> EventStream {
        let (sink, stream) = event::channel();
        let actor = self.clone();

        tokio::spawn(async move {
            actor.run(plan, sink, progress).await;
        });

        stream
    }
}

// ABOUTME: Step that creates a bits package and uploads whatever the platform lacks.
// ABOUTME: Matches resources first so only unknown files are archived and sent.

use std::sync::Arc;

use crate::platform::{Package, Platform};
use crate::push::event::Event;
use crate::push::{PushActor, PushError, PushPlan};
use crate::resources::{Resource, ResourceGatherer, matchable_resources, unmatched_resources};

use super::StepContext;
use super::upload::{TempArchive, UploadTarget};

impl<P, R> PushActor<P, R>
where
    P: Platform + 'static,
    R: ResourceGatherer + 'static,
{
    pub(super) async fn create_bits_package(
        &self,
        plan: &PushPlan,
        ctx: &mut StepContext<'_>,
    ) -> Result<PushPlan, PushError> {
        let resources = &plan.all_resources;

        // All-empty bits have nothing worth matching.
        let matched = if resources.iter().any(|r| r.size > 0) {
            ctx.emit(Event::ResourceMatching).await;
            let outcome = self
                .platform
                .resource_match(&matchable_resources(resources))
                .await;
            ctx.collect(outcome)?
        } else {
            Vec::new()
        };
        let unmatched = unmatched_resources(resources, &matched);
        tracing::debug!(
            "{} of {} resources already on the platform",
            matched.len(),
            resources.len()
        );

        ctx.emit(Event::CreatingPackage).await;
        let outcome = self
            .platform
            .create_bits_package(&plan.application.guid)
            .await;
        let package = ctx.collect(outcome)?;

        let uploaded = if !unmatched.is_empty() {
            ctx.emit(Event::CreatingArchive).await;
            let archive = self.create_archive(plan, unmatched).await?;
            let target = UploadTarget::Bits {
                package: &package,
                matched: &matched,
            };
            self.upload_with_retry(archive.path(), target, ctx)
                .await?
                .unwrap_or_else(|| package.clone())
        } else {
            ctx.emit(Event::UploadingApplication).await;
            let outcome = self
                .platform
                .upload_bits_package(&package, &matched, None)
                .await;
            ctx.collect(outcome)?
        };

        let polled = self.poll_package(&uploaded, ctx).await?;

        let mut next = plan.clone();
        next.package_guid = polled.guid;
        Ok(next)
    }

    pub(super) async fn poll_package(
        &self,
        package: &Package,
        ctx: &mut StepContext<'_>,
    ) -> Result<Package, PushError> {
        let outcome = self.platform.poll_package(package).await;
        Ok(ctx.collect(outcome)?)
    }

    /// Zip `unmatched` out of the bits path on a blocking thread.
    async fn create_archive(
        &self,
        plan: &PushPlan,
        unmatched: Vec<Resource>,
    ) -> Result<TempArchive, PushError> {
        let source = plan.bits_path.clone().ok_or(PushError::BitsPathUnset)?;
        let is_archive = plan.is_archive;
        let resources = Arc::clone(&self.resources);

        let path = tokio::task::spawn_blocking(move || {
            if is_archive {
                resources.zip_archive_resources(&source, &unmatched)
            } else {
                resources.zip_directory_resources(&source, &unmatched)
            }
        })
        .await??;

        tracing::debug!("archived unmatched resources to {}", path.display());
        Ok(TempArchive::new(path))
    }
}

// ABOUTME: Space preparation that runs before any plan is actualized.
// ABOUTME: Applies the manifest to the space, or creates the single named app without one.

use crate::config::Manifest;
use crate::platform::{ApiError, Application, Platform};
use crate::resources::ResourceGatherer;
use crate::types::{AppName, SpaceGuid};
use crate::warnings::Warnings;

use super::event::{self, Event, EventSink, EventStream, PushEvent};
use super::{PushActor, PushError};

/// What preparation has to do, decided before the task starts.
enum Preparation {
    Apply { raw: Vec<u8>, apps: Vec<AppName> },
    Create(AppName),
}

impl<P, R> PushActor<P, R>
where
    P: Platform + 'static,
    R: ResourceGatherer + 'static,
{
    /// Make sure `space` holds the applications about to be pushed.
    ///
    /// A manifest that lists applications is applied to the space as a whole.
    /// Every application it names is reported, or only `app_name` when one is
    /// given. Without a manifest, `app_name` is created unless it already
    /// exists. The stream ends after `Prepared` or `Failed`.
    pub fn prepare_space(
        &self,
        space: SpaceGuid,
        app_name: Option<&AppName>,
        manifest: &Manifest,
    ) -> EventStream {
        let (sink, stream) = event::channel();
        let preparation = preparation(app_name, manifest);
        let actor = self.clone();

        tokio::spawn(async move {
            let mut warnings = Warnings::new();
            let result = match preparation {
                Ok(Preparation::Apply { raw, apps }) => actor
                    .apply_manifest(&space, &raw, &sink, &mut warnings)
                    .await
                    .map(|()| apps),
                Ok(Preparation::Create(name)) => actor
                    .create_in_space(&space, &name, &sink, &mut warnings)
                    .await
                    .map(|()| vec![name]),
                Err(error) => Err(error),
            };

            sink.warnings(warnings).await;
            match result {
                Ok(apps) => sink.send(PushEvent::Prepared(apps)).await,
                Err(error) => {
                    tracing::warn!("preparing space {} failed: {}", space, error);
                    sink.send(PushEvent::Failed(error)).await;
                }
            }
        });

        stream
    }

    async fn apply_manifest(
        &self,
        space: &SpaceGuid,
        raw: &[u8],
        sink: &EventSink,
        warnings: &mut Warnings,
    ) -> Result<(), PushError> {
        sink.emit(Event::ApplyManifest).await;
        let outcome = self.platform.set_space_manifest(space, raw).await;
        outcome.collect(warnings)?;
        sink.emit(Event::ApplyManifestComplete).await;
        Ok(())
    }

    async fn create_in_space(
        &self,
        space: &SpaceGuid,
        name: &AppName,
        sink: &EventSink,
        warnings: &mut Warnings,
    ) -> Result<(), PushError> {
        sink.emit(Event::CreatingApplication).await;
        let outcome = self
            .platform
            .create_application(&Application::named(name.clone()), space)
            .await;

        match outcome.collect(warnings) {
            Ok(_) => sink.emit(Event::CreatedApplication).await,
            Err(ApiError::ApplicationAlreadyExists(_)) => {
                sink.emit(Event::ApplicationAlreadyExists).await
            }
            Err(err) => return Err(err.into()),
        }
        Ok(())
    }
}

fn preparation(app_name: Option<&AppName>, manifest: &Manifest) -> Result<Preparation, PushError> {
    match (manifest.raw_bytes(), app_name) {
        (Some(raw), Some(name)) => {
            if manifest.application(name.as_str()).is_none() {
                return Err(PushError::AppNotFoundInManifest(name.to_string()));
            }
            Ok(Preparation::Apply {
                raw: raw.to_vec(),
                apps: vec![name.clone()],
            })
        }
        (Some(raw), None) => Ok(Preparation::Apply {
            raw: raw.to_vec(),
            apps: manifest.applications.iter().map(|a| a.name.clone()).collect(),
        }),
        (None, Some(name)) => Ok(Preparation::Create(name.clone())),
        (None, None) => Err(PushError::MissingAppName),
    }
}

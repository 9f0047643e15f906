// ABOUTME: Progress events and the channel protocol between the actor and its caller.
// ABOUTME: One producer task, one consumer, bounded channel, closed once at the end.

use futures::Stream;
use serde::Serialize;
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;

use super::{PushError, PushPlan};
use crate::types::AppName;
use crate::warnings::Warnings;

/// Messages buffered before the producer waits for the consumer.
pub(crate) const EVENT_BUFFER: usize = 1;

/// A named milestone in a push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "details", rename_all = "snake_case")]
pub enum Event {
    ApplyManifest,
    ApplyManifestComplete,
    CreatingApplication,
    CreatedApplication,
    ApplicationAlreadyExists,
    UpdatingApplication,
    UpdatedApplication,
    CreatingAndMappingRoutes,
    CreatedRoutes,
    ScaleWebProcess,
    ScaleWebProcessComplete,
    SetProcessConfiguration,
    SetProcessConfigurationComplete,
    ResourceMatching,
    CreatingPackage,
    CreatingArchive,
    ReadingArchive,
    UploadingApplication,
    UploadingApplicationWithArchive,
    UploadWithArchiveComplete,
    RetryUpload,
    SetDockerImage,
    SetDockerImageComplete,
    CreatingDroplet,
    UploadingDroplet,
    UploadDropletComplete,
    StartingStaging,
    PollingBuild,
    StagingComplete,
    StoppingApplication,
    StoppingApplicationComplete,
    SettingDroplet,
    SetDropletComplete,
    RestartingApplication,
    RestartingApplicationComplete,
    StartingDeployment,
    WaitingForDeployment,
    /// Free-text instance status reported while waiting for startup.
    InstanceDetails(String),
    Complete,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Event::ApplyManifest => "Applying manifest to space",
            Event::ApplyManifestComplete => "Manifest applied",
            Event::CreatingApplication => "Creating app",
            Event::CreatedApplication => "App created",
            Event::ApplicationAlreadyExists => "App already exists, updating it",
            Event::UpdatingApplication => "Updating app",
            Event::UpdatedApplication => "App updated",
            Event::CreatingAndMappingRoutes => "Mapping routes",
            Event::CreatedRoutes => "Routes mapped",
            Event::ScaleWebProcess => "Scaling web process",
            Event::ScaleWebProcessComplete => "Web process scaled",
            Event::SetProcessConfiguration => "Updating process configuration",
            Event::SetProcessConfigurationComplete => "Process configuration updated",
            Event::ResourceMatching => "Comparing local files to remote cache",
            Event::CreatingPackage => "Creating package",
            Event::CreatingArchive => "Packaging files to upload",
            Event::ReadingArchive => "Reading archive",
            Event::UploadingApplication => "All files found in remote cache; nothing to upload",
            Event::UploadingApplicationWithArchive => "Uploading files",
            Event::UploadWithArchiveComplete => "Upload complete",
            Event::RetryUpload => "Upload interrupted, retrying",
            Event::SetDockerImage => "Setting docker image",
            Event::SetDockerImageComplete => "Docker image set",
            Event::CreatingDroplet => "Creating droplet",
            Event::UploadingDroplet => "Uploading droplet",
            Event::UploadDropletComplete => "Droplet uploaded",
            Event::StartingStaging => "Staging app",
            Event::PollingBuild => "Waiting for staging to finish",
            Event::StagingComplete => "Staging complete",
            Event::StoppingApplication => "Stopping app",
            Event::StoppingApplicationComplete => "App stopped",
            Event::SettingDroplet => "Setting droplet",
            Event::SetDropletComplete => "Droplet set",
            Event::RestartingApplication => "Restarting app",
            Event::RestartingApplicationComplete => "App started",
            Event::StartingDeployment => "Starting deployment",
            Event::WaitingForDeployment => "Waiting for deployment to finish",
            Event::InstanceDetails(details) => return f.write_str(details),
            Event::Complete => "Push complete",
        };
        f.write_str(text)
    }
}

/// Everything the actor sends to its caller.
#[derive(Debug)]
pub enum PushEvent {
    /// Snapshot of the plan after a step succeeded.
    Plan(Box<PushPlan>),
    Event(Event),
    /// Warnings collected by the step that just finished, successful or not.
    Warnings(Warnings),
    /// Applications present in the space once it is prepared.
    Prepared(Vec<AppName>),
    /// Terminal error. Nothing follows it.
    Failed(PushError),
}

/// Producer half held by the actor's background task.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::Sender<PushEvent>,
}

impl EventSink {
    /// Suspends while the consumer is behind.
    pub async fn send(&self, event: PushEvent) {
        if self.tx.send(event).await.is_err() {
            tracing::debug!("event consumer went away; dropping event");
        }
    }

    pub async fn emit(&self, event: Event) {
        tracing::debug!("event: {:?}", event);
        self.send(PushEvent::Event(event)).await;
    }

    pub async fn warnings(&self, warnings: Warnings) {
        if !warnings.is_empty() {
            self.send(PushEvent::Warnings(warnings)).await;
        }
    }
}

/// Consumer half. Ends when the actor finishes, successfully or not.
#[derive(Debug)]
pub struct EventStream {
    rx: mpsc::Receiver<PushEvent>,
}

/// Create a connected sink and stream.
pub fn channel() -> (EventSink, EventStream) {
    let (tx, rx) = mpsc::channel(EVENT_BUFFER);
    (EventSink { tx }, EventStream { rx })
}

impl EventStream {
    /// Next message, or `None` once the producer is done.
    pub async fn recv(&mut self) -> Option<PushEvent> {
        self.rx.recv().await
    }

    /// Drain the stream to its end.
    pub async fn collect_summary(mut self) -> PushSummary {
        let mut summary = PushSummary::default();
        while let Some(message) = self.recv().await {
            summary.record(message);
        }
        summary
    }
}

impl Stream for EventStream {
    type Item = PushEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

/// Everything a drained stream delivered.
#[derive(Debug, Default)]
pub struct PushSummary {
    /// Last plan snapshot received.
    pub plan: Option<PushPlan>,
    pub events: Vec<Event>,
    pub warnings: Warnings,
    /// Applications reported by space preparation.
    pub prepared: Vec<AppName>,
    pub error: Option<PushError>,
}

impl PushSummary {
    pub fn record(&mut self, message: PushEvent) {
        match message {
            PushEvent::Plan(plan) => self.plan = Some(*plan),
            PushEvent::Event(event) => self.events.push(event),
            PushEvent::Warnings(warnings) => self.warnings.append(warnings),
            PushEvent::Prepared(apps) => self.prepared = apps,
            PushEvent::Failed(error) => self.error = Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.events.last() == Some(&Event::Complete)
    }

    /// Events without instance status lines.
    pub fn milestones(&self) -> Vec<Event> {
        self.events
            .iter()
            .filter(|e| !matches!(e, Event::InstanceDetails(_)))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn stream_ends_when_sink_is_dropped() {
        let (sink, stream) = channel();

        let producer = tokio::spawn(async move {
            sink.emit(Event::CreatingApplication).await;
            sink.warnings(Warnings::from(["slow down"])).await;
            sink.warnings(Warnings::new()).await;
            sink.emit(Event::Complete).await;
        });

        let messages: Vec<_> = stream.collect().await;
        producer.await.unwrap();

        assert_eq!(messages.len(), 3);
        assert!(matches!(messages[1], PushEvent::Warnings(_)));
    }

    #[tokio::test]
    async fn summary_tracks_success() {
        let (sink, stream) = channel();
        tokio::spawn(async move {
            sink.emit(Event::InstanceDetails("1 of 1 running".into())).await;
            sink.emit(Event::Complete).await;
        });

        let summary = stream.collect_summary().await;
        assert!(summary.is_success());
        assert_eq!(summary.milestones(), [Event::Complete]);
    }

    #[test]
    fn events_serialize_as_tagged_objects() {
        let json = serde_json::to_string(&Event::RetryUpload).unwrap();
        assert_eq!(json, r#"{"event":"retry_upload"}"#);

        let json = serde_json::to_string(&Event::InstanceDetails("starting".into())).unwrap();
        assert_eq!(json, r#"{"event":"instance_details","details":"starting"}"#);
    }
}

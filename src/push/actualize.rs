// ABOUTME: Runs a plan's step sequence and streams progress to the caller.
// ABOUTME: Steps run strictly one after another; the first failure ends the run.

use std::sync::Arc;

use crate::platform::Platform;
use crate::resources::ResourceGatherer;

use super::event::{Event, EventSink, PushEvent};
use super::progress::ProgressBar;
use super::sequence::full_sequence;
use super::steps::{Advanced, Halted};
use super::{PushActor, PushPlan};

impl<P, R> PushActor<P, R>
where
    P: Platform + 'static,
    R: ResourceGatherer + 'static,
{
    /// Advance `plan` through every step, then close the stream by dropping `sink`.
    pub(super) async fn run(
        &self,
        mut plan: PushPlan,
        sink: EventSink,
        progress: Arc<dyn ProgressBar>,
    ) {
        let steps = full_sequence(&plan);
        tracing::info!("pushing {} in {} steps", plan.app_name(), steps.len());

        for step in steps {
            match self.run_step(step, plan, &sink, progress.as_ref()).await {
                Ok(Advanced { plan: next, warnings }) => {
                    sink.warnings(warnings).await;
                    sink.send(PushEvent::Plan(Box::new(next.clone()))).await;
                    plan = next;
                }
                Err(Halted {
                    plan: before,
                    warnings,
                    error,
                }) => {
                    tracing::warn!("{} failed at {}: {}", before.app_name(), step, error);
                    sink.warnings(warnings).await;
                    sink.send(PushEvent::Failed(error)).await;
                    return;
                }
            }
        }

        tracing::info!("pushed {}", plan.app_name());
        sink.emit(Event::Complete).await;
    }
}

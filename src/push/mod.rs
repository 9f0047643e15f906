// ABOUTME: The push engine: plans, builders, sequencing, steps and actualization.
// ABOUTME: Turns a manifest plus flags into ordered platform operations with progress events.

mod actor;
mod actualize;
pub mod builders;
mod error;
pub mod event;
mod plan;
mod prepare;
pub mod predicates;
pub mod progress;
pub mod sequence;
mod steps;
pub mod words;

pub use actor::PushActor;
pub use builders::create_push_plans;
pub use error::{PushError, PushErrorKind};
pub use event::{Event, EventSink, EventStream, PushEvent, PushSummary};
pub use plan::PushPlan;
pub use progress::{NoProgress, ProgressBar, TransferLog};
pub use sequence::Step;
pub use steps::{Advanced, Halted, StepResult};
pub use words::{FixedWords, RandomWords, WordList};

//! Command pipeline
//!
//! Utterance -> IntentResolver -> slot binding against the screen's
//! EntityContext -> dispatch through the screen's IntentTable -> handler
//! (optionally through the optimistic executor) -> feedback caption ->
//! completion signal.

pub mod binder;
pub mod completion;
pub mod context;
pub mod dispatcher;
pub mod feedback;
pub mod optimistic;
pub mod pipeline;
pub mod session;

pub use binder::{bind, SlotBinding};
pub use completion::{CompletionGuard, CompletionSignal};
pub use context::{Candidate, EntityContext};
pub use dispatcher::{dispatch, ActionReport, ActionResult, IntentTable, Route, Screen};
pub use feedback::{FeedbackSink, Prompt};
pub use optimistic::{MutationOutcome, SharedState};
pub use pipeline::CommandPipeline;
pub use session::{CommandGate, VoiceState};

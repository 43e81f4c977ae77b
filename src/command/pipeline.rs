//! Pipeline entry point: utterance -> intent -> binding -> action -> feedback
//!
//! Every call to `handle` fires its completion signal exactly once, on
//! every path, and never returns an error to the host.

use crate::command::completion::{CompletionGuard, CompletionSignal};
use crate::command::dispatcher::{dispatch, ActionResult, Screen};
use crate::command::feedback::{FeedbackSink, Prompt};
use crate::command::session::CommandGate;
use crate::llm::intent::Utterance;
use crate::llm::resolver::IntentResolver;
use std::sync::Arc;

pub struct CommandPipeline {
    resolver: IntentResolver,
    feedback: Arc<dyn FeedbackSink>,
}

impl CommandPipeline {
    pub fn new(resolver: IntentResolver, feedback: Arc<dyn FeedbackSink>) -> Self {
        Self { resolver, feedback }
    }

    /// Process one command on a screen
    pub async fn handle<S>(
        &self,
        screen: &S,
        utterance: Utterance,
        completion: Arc<dyn CompletionSignal>,
    ) -> ActionResult
    where
        S: Screen + ?Sized,
    {
        let mut guard = CompletionGuard::new(completion);
        let result = self.run(screen, &utterance).await;
        guard.fire();
        result
    }

    /// Submit through the input gate; `None` when a command is already in flight
    pub async fn submit<S>(&self, gate: &CommandGate, screen: &S, utterance: Utterance) -> Option<ActionResult>
    where
        S: Screen + ?Sized,
    {
        let Some(completion) = gate.try_begin() else {
            tracing::debug!("command refused, previous command still processing");
            return None;
        };
        Some(self.handle(screen, utterance, completion).await)
    }

    async fn run<S>(&self, screen: &S, utterance: &Utterance) -> ActionResult
    where
        S: Screen + ?Sized,
    {
        let context = screen.entity_context().await;
        let intent = self.resolver.resolve(utterance, &context).await;

        let Some(chosen) = dispatch(&intent, &context, screen.intent_table()) else {
            tracing::info!(
                screen = screen.name(),
                intent = intent.intent.tag(),
                "no action for command"
            );
            self.emit(&Prompt::ErrorGeneric.to_string());
            return ActionResult::NotApplicable;
        };

        tracing::debug!(
            screen = screen.name(),
            intent = intent.intent.tag(),
            action = ?chosen.route.action,
            targeted = chosen.target.is_some(),
            optimistic = chosen.route.optimistic,
            "dispatching command"
        );

        match screen
            .perform(chosen.route.action.clone(), chosen.target, &intent)
            .await
        {
            Ok(report) => {
                if let Some(message) = &report.feedback {
                    self.emit(message);
                }
                report.result
            }
            Err(err) => {
                tracing::error!(screen = screen.name(), "command handler failed: {}", err);
                self.emit(&Prompt::ActionFailed.to_string());
                ActionResult::Failed(err.to_string())
            }
        }
    }

    fn emit(&self, message: &str) {
        self.feedback.emit(message);
    }
}

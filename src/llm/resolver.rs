//! Bounded intent resolution
//!
//! Wraps an `IntentService` so that resolution never fails: transport
//! errors, unparsable replies and timeouts all collapse into the
//! unrecognized sentinel.

use crate::command::context::EntityContext;
use crate::llm::intent::{IntentResult, Utterance};
use crate::llm::parser::{IntentHints, IntentService};
use std::sync::Arc;
use std::time::Duration;

pub struct IntentResolver {
    service: Arc<dyn IntentService>,
    timeout: Duration,
}

impl IntentResolver {
    pub fn new(service: Arc<dyn IntentService>, timeout: Duration) -> Self {
        Self { service, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Classify an utterance, passing the on-screen names as hints
    pub async fn resolve<E>(&self, utterance: &Utterance, context: &EntityContext<E>) -> IntentResult {
        let hints = IntentHints::new(context.candidate_names());
        let call = self.service.process_intent(utterance.as_str(), &hints);

        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(result)) => {
                tracing::debug!(
                    intent = result.intent.tag(),
                    slots = result.slots.len(),
                    "resolved utterance"
                );
                result
            }
            Ok(Err(err)) => {
                tracing::warn!("intent resolution failed: {}", err);
                IntentResult::unrecognized()
            }
            Err(_) => {
                tracing::warn!(
                    "intent resolution timed out after {:?}",
                    self.timeout
                );
                IntentResult::unrecognized()
            }
        }
    }
}

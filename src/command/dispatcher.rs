//! Action dispatch - one generic dispatcher over declarative per-screen tables
//!
//! Resolution order:
//! 1. If the intent's slot binds to an on-screen entity, the screen's
//!    targeted routes for that tag win.
//! 2. A slot that names nothing on screen stops a tag that has targeted
//!    routes; no entity is guessed.
//! 3. Otherwise (no slot, or no targeted route for the tag) the global
//!    routes for that tag are tried.
//! 4. No route means the command was not understood on this screen.

use crate::command::binder::{bind_optional, SlotBinding};
use crate::command::context::EntityContext;
use crate::core::error::Result;
use crate::llm::intent::{Intent, IntentResult, SlotValue, TARGET_NAME};
use async_trait::async_trait;
use std::fmt::Debug;

/// Tri-state outcome of one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionResult {
    Succeeded,
    Failed(String),
    /// Recognized but nothing to do here (no route, missing target, precondition)
    NotApplicable,
}

/// What a handler did, plus the caption to show for it (if any)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionReport {
    pub result: ActionResult,
    pub feedback: Option<String>,
}

impl ActionReport {
    pub fn succeeded(feedback: impl Into<String>) -> Self {
        Self {
            result: ActionResult::Succeeded,
            feedback: Some(feedback.into()),
        }
    }

    pub fn silent() -> Self {
        Self {
            result: ActionResult::Succeeded,
            feedback: None,
        }
    }

    pub fn failed(reason: impl Into<String>, feedback: impl Into<String>) -> Self {
        Self {
            result: ActionResult::Failed(reason.into()),
            feedback: Some(feedback.into()),
        }
    }

    pub fn not_applicable() -> Self {
        Self {
            result: ActionResult::NotApplicable,
            feedback: None,
        }
    }

    pub fn not_applicable_with(feedback: impl Into<String>) -> Self {
        Self {
            result: ActionResult::NotApplicable,
            feedback: Some(feedback.into()),
        }
    }
}

/// One entry of a screen's intent table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route<A> {
    pub intent: Intent,
    pub action: A,
    /// Slot bound against the context (targeted routes only)
    pub slot: &'static str,
    /// Handler changes local state before the store confirms
    pub optimistic: bool,
}

/// Declarative intent table of one screen
#[derive(Debug, Clone)]
pub struct IntentTable<A> {
    targeted: Vec<Route<A>>,
    global: Vec<Route<A>>,
}

impl<A> IntentTable<A> {
    pub fn new() -> Self {
        Self {
            targeted: Vec::new(),
            global: Vec::new(),
        }
    }

    /// Route requiring a bound entity from the `target_name` slot
    pub fn targeted(self, intent: Intent, action: A) -> Self {
        self.targeted_on(intent, TARGET_NAME, action, false)
    }

    pub fn targeted_optimistic(self, intent: Intent, action: A) -> Self {
        self.targeted_on(intent, TARGET_NAME, action, true)
    }

    /// Route requiring a bound entity from an arbitrary slot
    pub fn targeted_on(mut self, intent: Intent, slot: &'static str, action: A, optimistic: bool) -> Self {
        self.targeted.push(Route {
            intent,
            action,
            slot,
            optimistic,
        });
        self
    }

    /// Route that runs without a bound entity
    pub fn global(mut self, intent: Intent, action: A) -> Self {
        self.global.push(Route {
            intent,
            action,
            slot: TARGET_NAME,
            optimistic: false,
        });
        self
    }

    pub fn global_optimistic(mut self, intent: Intent, action: A) -> Self {
        self.global.push(Route {
            intent,
            action,
            slot: TARGET_NAME,
            optimistic: true,
        });
        self
    }

    pub fn targeted_routes(&self) -> &[Route<A>] {
        &self.targeted
    }

    pub fn global_routes(&self) -> &[Route<A>] {
        &self.global
    }

    /// Whether this screen knows the tag at all
    pub fn recognizes(&self, intent: &Intent) -> bool {
        self.targeted
            .iter()
            .chain(self.global.iter())
            .any(|r| &r.intent == intent)
    }

    /// Slot a targeted route for this intent binds, if there is one
    pub fn slot_for(&self, intent: &Intent) -> Option<&'static str> {
        self.targeted
            .iter()
            .find(|r| &r.intent == intent)
            .map(|r| r.slot)
    }
}

impl<A> Default for IntentTable<A> {
    fn default() -> Self {
        Self::new()
    }
}

/// A screen that accepts commands
#[async_trait]
pub trait Screen: Send + Sync {
    type Entity: Clone + Send + Sync + Debug;
    type Action: Clone + Send + Sync + Debug;

    fn name(&self) -> &'static str;

    fn intent_table(&self) -> &IntentTable<Self::Action>;

    /// Entities the user can currently see and act on
    async fn entity_context(&self) -> EntityContext<Self::Entity>;

    /// Run a routed action; `target` is set for targeted routes only
    async fn perform(
        &self,
        action: Self::Action,
        target: Option<Self::Entity>,
        intent: &IntentResult,
    ) -> Result<ActionReport>;
}

/// The route chosen for a command
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch<'t, A, E> {
    pub route: &'t Route<A>,
    pub target: Option<E>,
}

/// Pick the route for an intent, binding its slot against the context
pub fn dispatch<'t, A, E: Clone>(
    intent: &IntentResult,
    context: &EntityContext<E>,
    table: &'t IntentTable<A>,
) -> Option<Dispatch<'t, A, E>> {
    let slot_name = table.slot_for(&intent.intent).unwrap_or(TARGET_NAME);
    let slot_text = intent.slot(slot_name).map(SlotValue::as_text);
    let binding = bind_optional(slot_text.as_deref(), context);

    match &binding {
        SlotBinding::Resolved(candidate) => {
            if let Some(route) = table
                .targeted
                .iter()
                .find(|r| r.intent == intent.intent && r.slot == slot_name)
            {
                return Some(Dispatch {
                    route,
                    target: Some(candidate.entity.clone()),
                });
            }
        }
        SlotBinding::Unresolved { value } => {
            tracing::debug!(slot = slot_name, value = %value, "slot did not bind");
            if table.slot_for(&intent.intent).is_some() {
                return None;
            }
        }
        SlotBinding::Absent => {}
    }

    table
        .global
        .iter()
        .find(|r| r.intent == intent.intent)
        .map(|route| Dispatch {
            route,
            target: None,
        })
}

//! NLU collaborator: LLM transport, intent vocabulary and bounded resolution

pub mod client;
pub mod intent;
pub mod parser;
pub mod resolver;

pub use client::LlmClient;
pub use intent::{Intent, IntentResult, SlotValue, Slots, Utterance};
pub use parser::{IntentHints, IntentService, LlmIntentService, TaggedIntentService};
pub use resolver::IntentResolver;

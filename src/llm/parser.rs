//! Turn utterances into intents through an LLM
//!
//! The model sees the vocabulary of intent tags and the names currently on
//! screen, and answers with one JSON object. Binding those names to real
//! entities happens later, in the slot binder; the model never decides
//! which entity a command acts on.

use crate::core::error::{Result, VoxError};
use crate::llm::client::LlmClient;
use crate::llm::intent::{Intent, IntentResult, RawIntent, SlotValue, KNOWN_TAGS};
use async_trait::async_trait;

/// Disambiguation hints sent with every utterance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntentHints {
    /// Display names of the entities visible on the active screen
    pub candidate_names: Vec<String>,
}

impl IntentHints {
    pub fn new(candidate_names: Vec<String>) -> Self {
        Self { candidate_names }
    }
}

/// External natural-language-understanding collaborator
#[async_trait]
pub trait IntentService: Send + Sync {
    async fn process_intent(&self, text: &str, hints: &IntentHints) -> Result<IntentResult>;
}

/// `IntentService` backed by a chat-completion model
pub struct LlmIntentService {
    client: LlmClient,
}

impl LlmIntentService {
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IntentService for LlmIntentService {
    async fn process_intent(&self, text: &str, hints: &IntentHints) -> Result<IntentResult> {
        let system_prompt = system_prompt();
        let user_prompt = user_prompt(text, hints);

        let response = self.client.complete(&system_prompt, &user_prompt).await?;
        parse_reply(&response)
    }
}

/// Reads commands already written as `intent_tag slot=value ...`
///
/// Used when no model is configured. Words after a `slot=value` pair
/// continue that value, so `target_name=Mary Ann` is one slot.
#[derive(Debug, Default, Clone, Copy)]
pub struct TaggedIntentService;

#[async_trait]
impl IntentService for TaggedIntentService {
    async fn process_intent(&self, text: &str, _hints: &IntentHints) -> Result<IntentResult> {
        parse_tagged(text)
    }
}

/// Parse `intent_tag slot=value ...`
pub fn parse_tagged(text: &str) -> Result<IntentResult> {
    let mut words = text.split_whitespace();
    let tag = words
        .next()
        .ok_or_else(|| VoxError::Nlu("empty command".into()))?;
    let mut result = IntentResult::new(Intent::from_tag(tag));

    let mut current: Option<(String, String)> = None;
    for word in words {
        match word.split_once('=') {
            Some((name, value)) if !name.is_empty() => {
                if let Some((name, value)) = current.take() {
                    result = result.with_slot(&name, SlotValue::Text(value));
                }
                current = Some((name.to_string(), value.to_string()));
            }
            _ => match current.as_mut() {
                Some((_, value)) => {
                    value.push(' ');
                    value.push_str(word);
                }
                None => {
                    return Err(VoxError::Nlu(format!("stray word '{}' before any slot", word)));
                }
            },
        }
    }
    if let Some((name, value)) = current {
        result = result.with_slot(&name, SlotValue::Text(value));
    }
    Ok(result)
}

fn user_prompt(text: &str, hints: &IntentHints) -> String {
    let names = if hints.candidate_names.is_empty() {
        "(none)".to_string()
    } else {
        hints.candidate_names.join(", ")
    };
    format!(
        "NAMES ON SCREEN: {}\n\nUSER COMMAND:\n{}\n\nClassify this command into JSON:",
        names, text
    )
}

/// Parse the model's reply into an intent result
pub fn parse_reply(response: &str) -> Result<IntentResult> {
    let json_str = extract_json(response)?;
    let raw: RawIntent = serde_json::from_str(json_str).map_err(|e| {
        VoxError::Nlu(format!(
            "Failed to parse intent: {} - Response: {}",
            e, response
        ))
    })?;
    Ok(raw.into())
}

/// Extract JSON object from LLM response (handles surrounding text)
fn extract_json(response: &str) -> Result<&str> {
    let start = response
        .find('{')
        .ok_or_else(|| VoxError::Nlu("No JSON found in response".into()))?;
    let end = response
        .rfind('}')
        .ok_or_else(|| VoxError::Nlu("No closing brace found in response".into()))?;
    if end < start {
        return Err(VoxError::Nlu("Malformed JSON in response".into()));
    }
    Ok(&response[start..=end])
}

fn system_prompt() -> String {
    format!(
        "{}\nAVAILABLE INTENTS:\n{}\n{}",
        PROMPT_HEADER,
        KNOWN_TAGS
            .iter()
            .map(|t| format!("- {}", t))
            .collect::<Vec<_>>()
            .join("\n"),
        PROMPT_FORMAT
    )
}

const PROMPT_HEADER: &str = r#"You classify spoken or typed commands for a social feed app.
Pick exactly one intent tag. If nothing fits, use "intent_unknown".
"#;

const PROMPT_FORMAT: &str = r#"
SLOTS:
- target_name: the person the command is about, copied from NAMES ON SCREEN when one matches
- option_text: the poll option the user is voting for
- option_index: the option's position counting from 1, when the user names a position instead
- emoji: the reaction emoji, when the user names one

OUTPUT FORMAT (JSON only, no explanation):
{"intent": "intent_tag", "slots": {"slot_name": "value"}}

Examples:
"accept alice" -> {"intent": "intent_accept_request", "slots": {"target_name": "Alice"}}
"open bob's profile" -> {"intent": "intent_open_profile", "slots": {"target_name": "Bob"}}
"go back" -> {"intent": "intent_go_back", "slots": {}}
"scroll down" -> {"intent": "intent_scroll_down", "slots": {}}
"vote for pizza" -> {"intent": "intent_vote_poll", "slots": {"option_text": "pizza"}}
"vote for the second option" -> {"intent": "intent_vote_poll", "slots": {"option_index": 2}}
"#;

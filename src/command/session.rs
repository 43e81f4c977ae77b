//! Input gate: one command in flight at a time
//!
//! The input surface asks the gate before submitting an utterance. While a
//! command is processing, further utterances are refused; the completion
//! signal handed out with each accepted command reopens the gate.

use crate::command::completion::CompletionSignal;
use std::sync::{Arc, Mutex, PoisonError};

/// Microphone / input state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VoiceState {
    #[default]
    Idle,
    Listening,
    Processing,
}

#[derive(Debug, Clone, Default)]
pub struct CommandGate {
    state: Arc<Mutex<VoiceState>>,
}

impl CommandGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> VoiceState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set(&self, next: VoiceState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = next;
    }

    /// Start accepting commands; no effect while one is processing
    pub fn start_listening(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state == VoiceState::Idle {
            *state = VoiceState::Listening;
        }
    }

    /// Stop accepting commands
    pub fn stop(&self) {
        self.set(VoiceState::Idle);
    }

    /// Claim the gate for one command
    ///
    /// Returns the completion signal for that command, or `None` while
    /// another command is still processing.
    pub fn try_begin(&self) -> Option<Arc<dyn CompletionSignal>> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state == VoiceState::Processing {
            return None;
        }
        *state = VoiceState::Processing;
        drop(state);

        let gate = self.clone();
        let signal: Arc<dyn CompletionSignal> = Arc::new(move || gate.finish());
        Some(signal)
    }

    fn finish(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state == VoiceState::Processing {
            *state = VoiceState::Listening;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_refuses_second_command() {
        let gate = CommandGate::new();
        gate.start_listening();
        assert_eq!(gate.state(), VoiceState::Listening);

        let signal = gate.try_begin().expect("gate should open");
        assert_eq!(gate.state(), VoiceState::Processing);
        assert!(gate.try_begin().is_none());

        signal.complete();
        assert_eq!(gate.state(), VoiceState::Listening);
        assert!(gate.try_begin().is_some());
    }

    #[test]
    fn test_stop_while_processing_stays_idle_after_completion() {
        let gate = CommandGate::new();
        let signal = gate.try_begin().unwrap();
        gate.stop();
        signal.complete();
        assert_eq!(gate.state(), VoiceState::Idle);
    }
}

//! Completion signal: fires exactly once per accepted command

use std::sync::Arc;

/// One-shot notification that a command finished processing
pub trait CompletionSignal: Send + Sync {
    fn complete(&self);
}

impl<F> CompletionSignal for F
where
    F: Fn() + Send + Sync,
{
    fn complete(&self) {
        self()
    }
}

/// Scoped owner of a completion signal
///
/// Fires the signal when dropped unless it already fired, so every exit
/// from the owning scope completes the command: early returns, `?`, and
/// panics unwinding through a collaborator.
pub struct CompletionGuard {
    signal: Option<Arc<dyn CompletionSignal>>,
}

impl CompletionGuard {
    pub fn new(signal: Arc<dyn CompletionSignal>) -> Self {
        Self {
            signal: Some(signal),
        }
    }

    /// Fire now; later calls and the drop are no-ops
    pub fn fire(&mut self) {
        if let Some(signal) = self.signal.take() {
            signal.complete();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.signal.is_some()
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        self.fire();
    }
}

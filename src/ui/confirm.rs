//! Confirmation collaborator for destructive actions

use async_trait::async_trait;

#[async_trait]
pub trait Confirmer: Send + Sync {
    /// Ask the user a yes/no question
    async fn confirm(&self, question: &str) -> bool;
}

/// Answers every question with a fixed reply
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

#[async_trait]
impl Confirmer for FixedAnswer {
    async fn confirm(&self, question: &str) -> bool {
        tracing::debug!(question, answer = self.0, "confirmation");
        self.0
    }
}

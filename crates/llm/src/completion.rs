use std::sync::Arc;

use async_trait::async_trait;

use crate::error::LlmError;

/// Opaque text-in/text-out generation.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Sends `prompt` and returns the generated text.
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;

    /// Like [`complete`](Self::complete), asking the service for a bare JSON
    /// object when it supports such a mode.
    async fn complete_json(&self, prompt: &str) -> Result<String, LlmError> {
        self.complete(prompt).await
    }
}

#[async_trait]
impl<C: CompletionService + ?Sized> CompletionService for Arc<C> {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        (**self).complete(prompt).await
    }

    async fn complete_json(&self, prompt: &str) -> Result<String, LlmError> {
        (**self).complete_json(prompt).await
    }
}

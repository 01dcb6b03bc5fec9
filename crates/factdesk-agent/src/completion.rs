//! The completion collaborator seam.
//!
//! The assistant only needs `prompt -> text`.  [`LlmClient`] is the production
//! implementation; tests plug in scripted fakes.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::llm::{ChatRequest, LlmClient};

/// An asynchronous, fallible text completion service.
#[async_trait]
pub trait Completion: Send + Sync {
    /// Complete `prompt` and return the model's text unchanged.
    async fn complete(&self, prompt: &str) -> Result<String>;
}

#[async_trait]
impl Completion for LlmClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let response = self.chat(&ChatRequest::single_user(prompt)).await?;
        tracing::debug!(
            provider = self.provider().name(),
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            stop_reason = ?response.stop_reason,
            "completion received"
        );
        Ok(response.text)
    }
}

#[async_trait]
impl<T: Completion + ?Sized> Completion for Arc<T> {
    async fn complete(&self, prompt: &str) -> Result<String> {
        (**self).complete(prompt).await
    }
}

//! LLM integration layer.
//!
//! - [`types`] -- Provider-agnostic requests and responses.
//! - [`client`] -- HTTP client for the Anthropic and OpenAI APIs.

pub mod client;
pub mod types;

// Re-export the most commonly used types for convenience.
pub use client::{LlmClient, LlmClientConfig, LlmProvider};
pub use types::{ChatRequest, LlmResponse, Usage};

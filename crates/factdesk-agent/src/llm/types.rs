//! Core types for LLM interaction.
//!
//! These types model the data flowing between the assistant and LLM
//! providers.  They are provider-agnostic at this layer; the [`super::client`]
//! module translates them into provider-specific wire formats.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// LLM response
// ---------------------------------------------------------------------------

/// The text a model produced for one request.
#[derive(Debug, Clone, Default)]
pub struct LlmResponse {
    /// Concatenated text blocks, exactly as returned.
    pub text: String,

    /// Why the model stopped (`"end_turn"`, `"stop"`, `"max_tokens"`, ...).
    pub stop_reason: Option<String>,

    /// Token accounting, when the provider reports it.
    pub usage: Usage,
}

// ---------------------------------------------------------------------------
// Chat request
// ---------------------------------------------------------------------------

/// A one-turn request to send to an LLM provider.
///
/// The prompt goes out as the only user message; factdesk never holds a
/// conversation, so there is no history or system turn.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// The model identifier.  Empty means the client's default model.
    pub model: String,

    /// The full prompt text.
    pub prompt: String,

    /// Maximum tokens the model may generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    /// A request carrying `prompt` and the client defaults.
    pub fn single_user(prompt: impl Into<String>) -> Self {
        Self {
            model: String::new(),
            prompt: prompt.into(),
            max_tokens: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Usage tracking
// ---------------------------------------------------------------------------

/// Token usage information returned by the LLM.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Number of tokens in the input (prompt).
    pub input_tokens: u32,
    /// Number of tokens generated by the model.
    pub output_tokens: u32,
}

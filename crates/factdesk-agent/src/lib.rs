//! Assistant core for factdesk.
//!
//! This crate holds everything between "the host supplied some facts and a
//! few display strings" and "the answer area shows some text":
//!
//! ```text
//! ┌──────────────┐    ┌───────────────┐    ┌────────────┐
//! │  AppConfig   │───>│  Assistant    │───>│ Completion │
//! │ (file, merge)│    │  Controller   │    │ (LlmClient)│
//! └──────────────┘    └──────┬────────┘    └────────────┘
//!                            │ build_prompt
//!                     ┌──────┴────────┐
//!                     │ KnowledgeBase │
//!                     └───────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`assistant`] -- The ask/answer state machine and thinking indicator.
//! - [`config`] -- Configuration file and widget option merge.
//! - [`knowledge`] -- The validated fact list.
//! - [`prompt`] -- Prompt construction.
//! - [`completion`] -- The completion collaborator trait.
//! - [`llm`] -- Anthropic / OpenAI HTTP client.
//! - [`error`] -- Agent error types.

pub mod assistant;
pub mod completion;
pub mod config;
pub mod error;
pub mod knowledge;
pub mod llm;
pub mod prompt;

// Re-export the most commonly used types at the crate root.
pub use assistant::{AnswerView, AssistantController, CycleOutcome};
pub use completion::Completion;
pub use config::{AppConfig, LlmSettings, PartialWidgetConfig, ServerSettings, WidgetConfig};
pub use error::{AgentError, Result};
pub use knowledge::KnowledgeBase;
pub use llm::{ChatRequest, LlmClient, LlmClientConfig, LlmProvider, LlmResponse};
pub use prompt::build_prompt;

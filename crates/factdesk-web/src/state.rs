//! Shared application state for the web server.
//!
//! [`AppState`] is wrapped in an `Arc` and shared across all request handlers
//! and WebSocket connections.  It holds the immutable widget setup and the
//! completion collaborator; every session builds its own
//! [`AssistantController`] from it.

use std::sync::Arc;
use std::time::Instant;

use factdesk_agent::{AssistantController, Completion, WidgetConfig};

use crate::WebConfig;

/// Shared state accessible from every Axum handler.
#[derive(Clone)]
pub struct AppState {
    /// The completion service shared by all sessions.
    pub completion: Arc<dyn Completion>,

    /// The effective widget configuration.
    pub widget: WidgetConfig,

    /// The configured facts, or `None` when the knowledge base is missing.
    pub facts: Option<Vec<String>>,

    /// The HTML served at `/`.
    pub page: String,

    /// Web server configuration.
    pub config: WebConfig,

    /// When the server state was created.
    pub started_at: Instant,
}

impl AppState {
    /// Build a fresh controller for one session or one-shot request.
    pub fn controller(&self) -> AssistantController {
        AssistantController::new(
            self.widget.clone(),
            self.facts.clone(),
            Arc::clone(&self.completion),
        )
    }

    /// Whether a usable knowledge base is configured.
    pub fn has_knowledge(&self) -> bool {
        self.facts.as_ref().is_some_and(|f| !f.is_empty())
    }

    /// Number of configured facts.
    pub fn fact_count(&self) -> usize {
        self.facts.as_ref().map_or(0, Vec::len)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("widget", &self.widget)
            .field("facts", &self.fact_count())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

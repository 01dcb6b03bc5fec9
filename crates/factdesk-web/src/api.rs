//! REST API route handlers.
//!
//! Provides the widget page, system status, the effective widget
//! configuration, and one-shot (non-WebSocket) questions.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use serde::{Deserialize, Serialize};

use factdesk_agent::assistant::CONFIG_ERROR_TEXT;
use factdesk_agent::{CycleOutcome, WidgetConfig};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET /
// ---------------------------------------------------------------------------

/// Serve the rendered widget page.
pub async fn page(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(state.page.clone())
}

// ---------------------------------------------------------------------------
// GET /api/status
// ---------------------------------------------------------------------------

/// Response payload for the `/api/status` endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub version: String,
    pub facts: usize,
    pub uptime_seconds: u64,
}

/// Return basic status information.  `status` is `"ok"`, or `"misconfigured"`
/// when no knowledge base is configured.
pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let status = if state.has_knowledge() {
        "ok"
    } else {
        "misconfigured"
    };

    Json(StatusResponse {
        status: status.into(),
        version: env!("CARGO_PKG_VERSION").into(),
        facts: state.fact_count(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    })
}

// ---------------------------------------------------------------------------
// GET /api/config
// ---------------------------------------------------------------------------

/// Return the effective widget configuration (camelCase keys).
pub async fn config(State(state): State<Arc<AppState>>) -> Json<WidgetConfig> {
    Json(state.widget.clone())
}

// ---------------------------------------------------------------------------
// POST /api/ask
// ---------------------------------------------------------------------------

/// Request body for `/api/ask`.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    /// The user's question.  A missing field counts as an empty question.
    #[serde(default)]
    pub question: String,
}

/// Response body for `/api/ask`.
#[derive(Debug, Serialize)]
pub struct AskResponse {
    /// How the cycle ended.
    pub outcome: CycleOutcome,
    /// What the answer area shows afterwards.
    pub text: String,
}

/// Run one ask/answer cycle on a fresh controller.
///
/// Always answers 200 with the resulting display text, except when no
/// knowledge base is configured (503).
pub async fn ask(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AskRequest>,
) -> impl IntoResponse {
    if !state.has_knowledge() {
        tracing::warn!("ask rejected: no knowledge base configured");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(AskResponse {
                outcome: CycleOutcome::Inert,
                text: CONFIG_ERROR_TEXT.to_owned(),
            }),
        );
    }

    let controller = state.controller();
    let outcome = controller.submit(&body.question).await;
    let text = controller.display().text().into_owned();
    tracing::info!(outcome = ?outcome, "one-shot ask finished");

    (StatusCode::OK, Json(AskResponse { outcome, text }))
}

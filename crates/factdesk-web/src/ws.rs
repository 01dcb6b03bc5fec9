//! WebSocket handler for live ask/answer sessions.
//!
//! Each connection owns one [`AssistantController`].  Inbound messages carry
//! questions; outbound messages mirror the answer area, starting with its
//! current content, then every change (thinking dots included).  Cycles run
//! concurrently with the socket reader so a newer question can supersede an
//! older one; closing the socket abandons any cycle still in flight.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

use factdesk_agent::{AnswerView, AssistantController};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// WebSocket message types
// ---------------------------------------------------------------------------

/// Inbound message from the client.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    /// Run an ask/answer cycle.
    Ask {
        #[serde(default)]
        question: String,
    },
}

/// Outbound message sent to the client.
#[derive(Debug, Serialize)]
pub struct OutboundMessage {
    /// Message type: `"display"` or `"error"`.
    #[serde(rename = "type")]
    pub msg_type: &'static str,

    /// Display kind (present for `display`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,

    /// Answer area text, or the error description.
    pub text: String,
}

impl OutboundMessage {
    /// Mirror the answer area.
    pub fn display(view: &AnswerView) -> Self {
        Self {
            msg_type: "display",
            kind: Some(view.kind()),
            text: view.text().into_owned(),
        }
    }

    /// Report a protocol problem with the client's message.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            msg_type: "error",
            kind: None,
            text: text.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Handler
// ---------------------------------------------------------------------------

/// Axum handler that upgrades the HTTP connection to a WebSocket.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Process a single WebSocket connection.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let session = Uuid::now_v7();
    let controller = Arc::new(state.controller());
    info!(%session, inert = controller.is_inert(), "WebSocket client connected");

    let (sink, mut stream) = socket.split();
    let (errors_tx, errors_rx) = mpsc::unbounded_channel();
    let forwarder = tokio::spawn(forward_display(sink, &controller, errors_rx));

    let mut cycles = JoinSet::new();
    loop {
        tokio::select! {
            incoming = stream.next() => {
                let Some(Ok(msg)) = incoming else { break };
                let text = match msg {
                    Message::Text(t) => t,
                    Message::Close(_) => break,
                    // Ignore binary, ping, pong.
                    _ => continue,
                };

                match serde_json::from_str::<InboundMessage>(&text) {
                    Ok(InboundMessage::Ask { question }) => {
                        let controller = Arc::clone(&controller);
                        cycles.spawn(async move { controller.submit(&question).await });
                    }
                    Err(e) => {
                        debug!(%session, error = %e, "rejecting malformed message");
                        let _ = errors_tx.send(OutboundMessage::error(e.to_string()));
                    }
                }
            }
            Some(done) = cycles.join_next() => match done {
                Ok(outcome) => debug!(%session, outcome = ?outcome, "ask cycle finished"),
                Err(e) => warn!(%session, error = %e, "ask cycle task failed"),
            },
        }
    }

    if !cycles.is_empty() {
        debug!(%session, pending = cycles.len(), "abandoning in-flight ask cycles");
    }
    cycles.shutdown().await;
    forwarder.abort();

    info!(%session, "WebSocket client disconnected");
}

/// Send the current display, then every change of it and every queued error,
/// until the socket or the controller goes away.
fn forward_display(
    mut sink: SplitSink<WebSocket, Message>,
    controller: &AssistantController,
    mut errors: mpsc::UnboundedReceiver<OutboundMessage>,
) -> impl Future<Output = ()> + Send + 'static {
    let mut display = controller.subscribe();

    async move {
        let current = display.borrow_and_update().clone();
        if send(&mut sink, &OutboundMessage::display(&current)).await.is_err() {
            return;
        }

        loop {
            let msg = tokio::select! {
                changed = display.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let view = display.borrow_and_update().clone();
                    OutboundMessage::display(&view)
                }
                Some(msg) = errors.recv() => msg,
            };

            if send(&mut sink, &msg).await.is_err() {
                break;
            }
        }
    }
}

/// Serialize and send a JSON message over the WebSocket.
async fn send(
    sink: &mut SplitSink<WebSocket, Message>,
    msg: &OutboundMessage,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let json = serde_json::to_string(msg)?;
    sink.send(Message::Text(json.into())).await?;
    Ok(())
}

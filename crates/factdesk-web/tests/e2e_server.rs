//! End-to-end tests for the HTTP and WebSocket surface.
//!
//! These tests spin up the **real** Axum router on an OS-assigned ephemeral
//! port, make actual requests via `reqwest` and `tokio-tungstenite`, and
//! verify the full request/response cycle including JSON parsing.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Json;
use axum::Router;
use axum::routing::post;
use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tokio_tungstenite::tungstenite::Message;

use factdesk_agent::assistant::{CONFIG_ERROR_TEXT, EMPTY_QUESTION_TEXT, SERVICE_ERROR_TEXT};
use factdesk_agent::{AgentError, AppConfig, Completion, LlmClient, WidgetConfig};
use factdesk_web::{WebConfig, WebServer};

// ── fakes ────────────────────────────────────────────────────────────────────

/// Answers every prompt with a fixed text, or fails.
struct Fixed(Option<&'static str>);

#[async_trait]
impl Completion for Fixed {
    async fn complete(&self, _prompt: &str) -> factdesk_agent::Result<String> {
        self.0
            .map(str::to_owned)
            .ok_or_else(|| AgentError::LlmRequestFailed {
                reason: "upstream unavailable".into(),
            })
    }
}

/// Questions ending in "slow" wait for `release`; everything else answers
/// at once.  The answer echoes the last word of the prompt.
struct Gated {
    release: Arc<Notify>,
}

#[async_trait]
impl Completion for Gated {
    async fn complete(&self, prompt: &str) -> factdesk_agent::Result<String> {
        if prompt.ends_with("slow") {
            self.release.notified().await;
        }
        let last = prompt.rsplit(' ').next().unwrap_or_default();
        Ok(format!("{last} answer"))
    }
}

// ── helpers ──────────────────────────────────────────────────────────────────

fn facts() -> Option<Vec<String>> {
    Some(vec!["We are open 9–5.".into(), "Closed Sundays.".into()])
}

/// Bind to 127.0.0.1:0, start the router, return (address, server task).
async fn start_server(
    facts: Option<Vec<String>>,
    completion: Arc<dyn Completion>,
) -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let server = WebServer::new(WebConfig::default(), WidgetConfig::default(), facts, completion);
    serve_router(server.router()).await
}

async fn serve_router(app: Router) -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind to port 0");
    let addr = listener.local_addr().expect("get local addr");

    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    // Small yield so the listener is ready.
    tokio::time::sleep(Duration::from_millis(10)).await;

    (addr, handle)
}

type Socket =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

async fn connect(addr: SocketAddr) -> Socket {
    let (socket, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws"))
        .await
        .expect("websocket connect");
    socket
}

/// Next JSON text frame, or `None` if nothing arrives within `wait`.
async fn next_json(socket: &mut Socket, wait: Duration) -> Option<Value> {
    loop {
        let msg = tokio::time::timeout(wait, socket.next()).await.ok()??.ok()?;
        if let Message::Text(text) = msg {
            return Some(serde_json::from_str(text.as_str()).expect("server sent invalid JSON"));
        }
    }
}

/// Read display messages until one of `kind` arrives.
async fn until_kind(socket: &mut Socket, kind: &str) -> Value {
    loop {
        let msg = next_json(socket, Duration::from_secs(5))
            .await
            .unwrap_or_else(|| panic!("no `{kind}` display received"));
        if msg["type"] == "display" && msg["kind"] == kind {
            return msg;
        }
    }
}

async fn ask(socket: &mut Socket, question: &str) {
    let frame = json!({"type": "ask", "question": question}).to_string();
    socket.send(Message::text(frame)).await.expect("send ask");
}

// ── GET / and GET /api/* ─────────────────────────────────────────────────────

#[tokio::test]
async fn index_serves_widget_page() {
    let (addr, _srv) = start_server(facts(), Arc::new(Fixed(Some("ok")))).await;

    let resp = reqwest::get(format!("http://{addr}/")).await.expect("request failed");
    assert_eq!(resp.status(), 200);
    let content_type = resp.headers()["content-type"].to_str().unwrap().to_owned();
    assert!(content_type.starts_with("text/html"));

    let body = resp.text().await.unwrap();
    assert!(body.contains("<title>Website Assistant</title>"));
    assert!(body.contains("<h1>How can I help you?</h1>"));
}

#[tokio::test]
async fn config_endpoint_uses_camel_case() {
    let (addr, _srv) = start_server(facts(), Arc::new(Fixed(Some("ok")))).await;

    let json: Value = reqwest::get(format!("http://{addr}/api/config"))
        .await
        .unwrap()
        .json()
        .await
        .expect("invalid JSON");
    assert_eq!(json["pageTitle"], "Website Assistant");
    assert_eq!(json["submitButtonText"], "Send");
    assert!(json.get("page_title").is_none());
}

#[tokio::test]
async fn status_reports_fact_count() {
    let (addr, _srv) = start_server(facts(), Arc::new(Fixed(Some("ok")))).await;

    let json: Value = reqwest::get(format!("http://{addr}/api/status"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["facts"], 2);
    assert!(json["version"].is_string());
    assert!(json["uptime_seconds"].is_u64());
}

#[tokio::test]
async fn status_reports_missing_knowledge() {
    let (addr, _srv) = start_server(None, Arc::new(Fixed(Some("ok")))).await;

    let json: Value = reqwest::get(format!("http://{addr}/api/status"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(json["status"], "misconfigured");
    assert_eq!(json["facts"], 0);
}

// ── POST /api/ask ────────────────────────────────────────────────────────────

async fn post_ask(addr: SocketAddr, body: Value) -> (u16, Value) {
    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/api/ask"))
        .json(&body)
        .send()
        .await
        .expect("request failed");
    let status = resp.status().as_u16();
    (status, resp.json().await.expect("invalid JSON"))
}

#[tokio::test]
async fn ask_returns_answer_verbatim() {
    let (addr, _srv) = start_server(facts(), Arc::new(Fixed(Some("We are open 9–5.")))).await;

    let (status, json) = post_ask(addr, json!({"question": "What are your hours?"})).await;
    assert_eq!(status, 200);
    assert_eq!(json["outcome"], "answered");
    assert_eq!(json["text"], "We are open 9–5.");
}

#[tokio::test]
async fn ask_with_empty_question() {
    let (addr, _srv) = start_server(facts(), Arc::new(Fixed(Some("unused")))).await;

    for body in [json!({"question": ""}), json!({})] {
        let (status, json) = post_ask(addr, body).await;
        assert_eq!(status, 200);
        assert_eq!(json["outcome"], "empty_question");
        assert_eq!(json["text"], EMPTY_QUESTION_TEXT);
    }
}

#[tokio::test]
async fn ask_reports_service_error() {
    let (addr, _srv) = start_server(facts(), Arc::new(Fixed(None))).await;

    let (status, json) = post_ask(addr, json!({"question": "Hi?"})).await;
    assert_eq!(status, 200);
    assert_eq!(json["outcome"], "failed");
    assert_eq!(json["text"], SERVICE_ERROR_TEXT);
}

#[tokio::test]
async fn ask_without_knowledge_is_unavailable() {
    let (addr, _srv) = start_server(None, Arc::new(Fixed(Some("unused")))).await;

    let (status, json) = post_ask(addr, json!({"question": "Hi?"})).await;
    assert_eq!(status, 503);
    assert_eq!(json["outcome"], "inert");
    assert_eq!(json["text"], CONFIG_ERROR_TEXT);
}

// ── GET /ws ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn ws_sends_greeting_on_connect() {
    let (addr, _srv) = start_server(facts(), Arc::new(Fixed(Some("ok")))).await;
    let mut socket = connect(addr).await;

    let first = next_json(&mut socket, Duration::from_secs(5)).await.unwrap();
    assert_eq!(first["type"], "display");
    assert_eq!(first["kind"], "initial");
    assert_eq!(first["text"], WidgetConfig::default().initial_answer_text);
}

#[tokio::test]
async fn ws_shows_thinking_then_answer() {
    let release = Arc::new(Notify::new());
    let completion = Arc::new(Gated {
        release: Arc::clone(&release),
    });
    let (addr, _srv) = start_server(facts(), completion).await;
    let mut socket = connect(addr).await;
    until_kind(&mut socket, "initial").await;

    ask(&mut socket, "Are you open today slow").await;
    let thinking = until_kind(&mut socket, "thinking").await;
    assert!(thinking["text"].as_str().unwrap().starts_with("Looking up the answer to your question."));

    release.notify_one();
    let answer = until_kind(&mut socket, "answer").await;
    assert_eq!(answer["text"], "slow answer");
}

#[tokio::test]
async fn ws_empty_question() {
    let (addr, _srv) = start_server(facts(), Arc::new(Fixed(Some("unused")))).await;
    let mut socket = connect(addr).await;
    until_kind(&mut socket, "initial").await;

    ask(&mut socket, "   ").await;
    let msg = until_kind(&mut socket, "empty_question").await;
    assert_eq!(msg["text"], EMPTY_QUESTION_TEXT);
}

#[tokio::test]
async fn ws_discards_superseded_answer() {
    let release = Arc::new(Notify::new());
    let completion = Arc::new(Gated {
        release: Arc::clone(&release),
    });
    let (addr, _srv) = start_server(facts(), completion).await;
    let mut socket = connect(addr).await;
    until_kind(&mut socket, "initial").await;

    ask(&mut socket, "first slow").await;
    until_kind(&mut socket, "thinking").await;
    ask(&mut socket, "second fast").await;
    let answer = until_kind(&mut socket, "answer").await;
    assert_eq!(answer["text"], "fast answer");

    release.notify_one();
    assert!(
        next_json(&mut socket, Duration::from_millis(300)).await.is_none(),
        "stale answer must not reach the client"
    );
}

#[tokio::test]
async fn ws_without_knowledge_ignores_questions() {
    let (addr, _srv) = start_server(None, Arc::new(Fixed(Some("unused")))).await;
    let mut socket = connect(addr).await;

    let first = next_json(&mut socket, Duration::from_secs(5)).await.unwrap();
    assert_eq!(first["kind"], "config_error");
    assert_eq!(first["text"], CONFIG_ERROR_TEXT);

    ask(&mut socket, "Hello?").await;
    assert!(next_json(&mut socket, Duration::from_millis(300)).await.is_none());
}

#[tokio::test]
async fn ws_rejects_unknown_message() {
    let (addr, _srv) = start_server(facts(), Arc::new(Fixed(Some("ok")))).await;
    let mut socket = connect(addr).await;
    until_kind(&mut socket, "initial").await;

    socket
        .send(Message::text(r#"{"type":"chat","content":"hi"}"#))
        .await
        .unwrap();
    let msg = next_json(&mut socket, Duration::from_secs(5)).await.unwrap();
    assert_eq!(msg["type"], "error");
}

// ── real LlmClient against a local OpenAI-compatible endpoint ────────────────

async fn fake_openai(status: u16) -> SocketAddr {
    let app = Router::new().route(
        "/v1/chat/completions",
        post(move |Json(body): Json<Value>| async move {
            let prompt = body["messages"][0]["content"].as_str().unwrap_or_default().to_owned();
            let reply = if prompt.contains("[Known Information]\n- We are open 9–5.") {
                "We are open 9–5."
            } else {
                "prompt not grounded"
            };
            (
                axum::http::StatusCode::from_u16(status).unwrap(),
                Json(json!({
                    "choices": [{"message": {"role": "assistant", "content": reply}, "finish_reason": "stop"}],
                    "usage": {"prompt_tokens": 42, "completion_tokens": 5}
                })),
            )
        }),
    );
    serve_router(app).await.0
}

async fn llm_client_for(upstream: SocketAddr) -> Arc<dyn Completion> {
    let config = AppConfig::from_toml_str(&format!(
        "[llm]\nprovider = \"openai\"\nbase_url = \"http://{upstream}/v1\"\ntimeout_secs = 5\n"
    ))
    .unwrap();
    Arc::new(LlmClient::new(config.llm.client_config("sk-test")).unwrap())
}

#[tokio::test]
async fn ask_through_llm_client() {
    let upstream = fake_openai(200).await;
    let (addr, _srv) = start_server(facts(), llm_client_for(upstream).await).await;

    let (status, json) = post_ask(addr, json!({"question": "What are your hours?"})).await;
    assert_eq!(status, 200);
    assert_eq!(json["outcome"], "answered");
    assert_eq!(json["text"], "We are open 9–5.");
}

#[tokio::test]
async fn upstream_failure_becomes_service_error() {
    let upstream = fake_openai(500).await;
    let (addr, _srv) = start_server(facts(), llm_client_for(upstream).await).await;

    let (status, json) = post_ask(addr, json!({"question": "What are your hours?"})).await;
    assert_eq!(status, 200);
    assert_eq!(json["outcome"], "failed");
    assert_eq!(json["text"], SERVICE_ERROR_TEXT);
}

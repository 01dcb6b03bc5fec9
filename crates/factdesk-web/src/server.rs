//! Main web server setup and startup.
//!
//! [`WebServer`] renders the page once, composes the Axum router, and starts
//! the HTTP listener.

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::http::Method;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use factdesk_agent::{AnswerView, Completion, WidgetConfig};

use crate::error::{Result, WebError};
use crate::frontend::{MountPoint, mount_into, render_page};
use crate::state::AppState;
use crate::{WebConfig, api, ws};

/// The factdesk web server.
pub struct WebServer {
    config: WebConfig,
    state: AppState,
    initial: AnswerView,
}

impl WebServer {
    /// Create a new web server serving the standalone widget page.
    ///
    /// # Arguments
    ///
    /// * `config` - Bind address and port configuration.
    /// * `widget` - The effective widget configuration.
    /// * `facts` - The knowledge base; `None` or empty leaves every session inert.
    /// * `completion` - The completion service shared across all sessions.
    pub fn new(
        config: WebConfig,
        widget: WidgetConfig,
        facts: Option<Vec<String>>,
        completion: Arc<dyn Completion>,
    ) -> Self {
        let mut state = AppState {
            completion,
            widget,
            facts,
            page: String::new(),
            config: config.clone(),
            started_at: Instant::now(),
        };
        let initial = state.controller().display();
        state.page = render_page(&state.widget, &initial);

        Self {
            config,
            state,
            initial,
        }
    }

    /// Serve `host_html` with the widget mounted at `mount` instead of the
    /// standalone page.
    ///
    /// # Errors
    ///
    /// Fails when the mount point does not exist in the host page.
    pub fn with_host_page(mut self, host_html: &str, mount: &MountPoint) -> Result<Self> {
        self.state.page = mount_into(host_html, &self.state.widget, &self.initial, mount)?;
        Ok(self)
    }

    /// The shared state handlers will see.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Return the `host:port` string this server will bind to.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.config.bind_addr, self.config.port)
    }

    /// Build the Axum router with all routes registered.
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers(Any);

        Router::new()
            // Widget page.
            .route("/", get(api::page))
            // REST API.
            .route("/api/status", get(api::status))
            .route("/api/config", get(api::config))
            .route("/api/ask", post(api::ask))
            // WebSocket.
            .route("/ws", get(ws::ws_handler))
            .layer(cors)
            .with_state(Arc::new(self.state.clone()))
    }

    /// Bind the configured address and serve until Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns an error if the TCP listener cannot be bound or the server
    /// fails.
    pub async fn start(self) -> Result<()> {
        let addr = self.addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| WebError::Bind { addr, source })?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener until Ctrl-C.
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        let local = listener.local_addr()?;
        info!(
            addr = %local,
            facts = self.state.fact_count(),
            inert = !self.state.has_knowledge(),
            "starting web server"
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(async {
                tokio::signal::ctrl_c().await.ok();
                info!("shutdown signal received");
            })
            .await?;

        info!("web server stopped");
        Ok(())
    }
}

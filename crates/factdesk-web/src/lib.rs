//! Web interface for factdesk.
//!
//! This crate serves the question/answer widget over HTTP.  It includes:
//!
//! - The widget page (or a host page with the widget mounted into it) at `/`.
//! - A WebSocket endpoint that runs ask cycles and pushes every change of the
//!   answer area to the browser.
//! - A small REST API for status, the effective widget configuration, and
//!   one-shot questions.

pub mod api;
pub mod error;
pub mod frontend;
pub mod server;
pub mod state;
pub mod ws;

pub use error::{Result, WebError};
pub use frontend::{MountPoint, mount_into, render_page, render_widget};
pub use server::WebServer;
pub use state::AppState;

/// Web server configuration.
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// The address to bind the HTTP server to.
    pub bind_addr: String,
    /// The port to listen on.
    pub port: u16,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".into(),
            port: 3000,
        }
    }
}

impl From<&factdesk_agent::ServerSettings> for WebConfig {
    fn from(settings: &factdesk_agent::ServerSettings) -> Self {
        Self {
            bind_addr: settings.bind.clone(),
            port: settings.port,
        }
    }
}

//! Application configuration.
//!
//! A single file (TOML, or JSON when the extension is `.json`) supplies the
//! knowledge base, the partial widget options, the LLM endpoint, and the web
//! server settings:
//!
//! ```toml
//! knowledge = ["We are open 9-5 on weekdays.", "Shipping is free over $50."]
//!
//! [widget]
//! headerTitle = "Ask us anything"
//!
//! [llm]
//! provider = "openai"
//! model = "gpt-4o-mini"
//!
//! [server]
//! port = 8080
//! ```
//!
//! The file is read once at startup; nothing here changes afterwards.

pub mod widget;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{AgentError, Result};
use crate::llm::{LlmClientConfig, LlmProvider};

pub use widget::{PartialWidgetConfig, WidgetConfig};

/// Default model when the `[llm]` section targets Anthropic and names none.
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";

/// Default model when the `[llm]` section targets OpenAI and names none.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

// ---------------------------------------------------------------------------
// Top-level file
// ---------------------------------------------------------------------------

/// Everything the assistant needs before it starts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Facts the assistant may answer from.  `None` when the key is absent,
    /// which the assistant treats the same as an empty list.
    #[serde(default)]
    pub knowledge: Option<Vec<String>>,

    /// Caller-supplied widget options, merged over the defaults.
    #[serde(default)]
    pub widget: PartialWidgetConfig,

    /// Completion endpoint settings.
    #[serde(default)]
    pub llm: LlmSettings,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerSettings,
}

impl AppConfig {
    /// Load configuration from `path`.
    ///
    /// Files ending in `.json` are parsed as JSON, everything else as TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| AgentError::ConfigError {
            reason: format!("failed to read config file {}: {e}", path.display()),
        })?;

        let config = if path.extension().and_then(|s| s.to_str()) == Some("json") {
            Self::from_json_str(&content)?
        } else {
            Self::from_toml_str(&content)?
        };

        info!(
            path = %path.display(),
            facts = config.knowledge.as_ref().map_or(0, Vec::len),
            "configuration loaded from file"
        );
        Ok(config)
    }

    /// Parse a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| AgentError::ConfigError {
            reason: format!("failed to parse TOML config: {e}"),
        })
    }

    /// Parse a JSON document.
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| AgentError::ConfigError {
            reason: format!("failed to parse JSON config: {e}"),
        })
    }

    /// The effective widget configuration.
    pub fn widget_config(&self) -> WidgetConfig {
        WidgetConfig::merged(&self.widget)
    }
}

// ---------------------------------------------------------------------------
// [llm]
// ---------------------------------------------------------------------------

/// Settings for the completion endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Which wire protocol to speak.
    pub provider: LlmProvider,
    /// Model identifier.  Falls back to a per-provider default.
    pub model: Option<String>,
    /// Override for the API base URL (OpenAI-compatible servers, proxies).
    pub base_url: Option<String>,
    /// Maximum tokens per answer.
    pub max_tokens: u32,
    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Anthropic,
            model: None,
            base_url: None,
            max_tokens: 1024,
            timeout_secs: 120,
        }
    }
}

impl LlmSettings {
    /// Name of the environment variable holding the API key.
    pub fn api_key_env(&self) -> &'static str {
        match self.provider {
            LlmProvider::Anthropic => "ANTHROPIC_API_KEY",
            LlmProvider::OpenAI => "OPENAI_API_KEY",
        }
    }

    /// The model to request, after applying the per-provider default.
    pub fn effective_model(&self) -> String {
        self.model.clone().unwrap_or_else(|| {
            match self.provider {
                LlmProvider::Anthropic => DEFAULT_ANTHROPIC_MODEL,
                LlmProvider::OpenAI => DEFAULT_OPENAI_MODEL,
            }
            .to_owned()
        })
    }

    /// Build the client configuration for the given API key.
    pub fn client_config(&self, api_key: impl Into<String>) -> LlmClientConfig {
        let model = self.effective_model();
        let mut config = match (&self.provider, &self.base_url) {
            (LlmProvider::OpenAI, Some(base_url)) => {
                LlmClientConfig::openai_compatible(api_key, model, base_url.clone())
            }
            (LlmProvider::OpenAI, None) => LlmClientConfig::openai(api_key, model),
            (LlmProvider::Anthropic, base_url) => {
                let mut config = LlmClientConfig::anthropic(api_key, model);
                if let Some(base_url) = base_url {
                    config.base_url = base_url.clone();
                }
                config
            }
        };
        config.max_tokens = self.max_tokens;
        config.timeout_secs = self.timeout_secs;
        debug!(provider = ?config.provider, model = %config.default_model, "llm client configured");
        config
    }
}

// ---------------------------------------------------------------------------
// [server]
// ---------------------------------------------------------------------------

/// Settings for the web server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// The address to bind the HTTP server to.
    pub bind: String,
    /// The port to listen on.
    pub port: u16,
    /// Optional host page to mount the widget into instead of serving a
    /// standalone page.
    pub host_page: Option<PathBuf>,
    /// Id of the placeholder element in the host page.  When unset the widget
    /// replaces the host page body.
    pub mount: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            port: 3000,
            host_page: None,
            mount: None,
        }
    }
}

// -------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------

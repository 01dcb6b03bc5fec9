//! Shared helper functions used across CLI subcommands.
//!
//! Includes tracing initialization, configuration file resolution, and
//! completion client construction from the environment.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use factdesk_agent::{AgentError, AppConfig, Completion, KnowledgeBase, LlmClient, LlmSettings};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Config file used when neither `--config` nor `FACTDESK_CONFIG` is given.
pub const DEFAULT_CONFIG_FILE: &str = "factdesk.toml";

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "FACTDESK_CONFIG";

// ---------------------------------------------------------------------------
// Tracing
// ---------------------------------------------------------------------------

/// Initialize the tracing subscriber with the given default log level.
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// A loaded configuration and the file it came from, if any.
pub struct Loaded {
    pub config: AppConfig,
    pub path: Option<PathBuf>,
}

impl Loaded {
    /// The host page path, resolved against the config file's directory
    /// when relative.
    pub fn host_page(&self) -> Option<PathBuf> {
        let page = self.config.server.host_page.as_ref()?;
        let base = self.path.as_deref().and_then(Path::parent);
        Some(match base {
            Some(dir) if page.is_relative() => dir.join(page),
            _ => page.clone(),
        })
    }
}

/// Pick the config file: `--config`, then `FACTDESK_CONFIG`, then
/// `./factdesk.toml` when it exists.
pub fn resolve_config_path(
    explicit: Option<&Path>,
    from_env: Option<String>,
    default_exists: bool,
) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| from_env.map(PathBuf::from))
        .or_else(|| default_exists.then(|| PathBuf::from(DEFAULT_CONFIG_FILE)))
}

/// Load the configuration, or the defaults when no file is configured.
pub fn load_config(explicit: Option<&Path>) -> Result<Loaded> {
    let path = resolve_config_path(
        explicit,
        env_non_empty(CONFIG_ENV),
        Path::new(DEFAULT_CONFIG_FILE).exists(),
    );

    let config = match &path {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => {
            debug!("no configuration file, using defaults");
            AppConfig::default()
        }
    };

    Ok(Loaded { config, path })
}

// ---------------------------------------------------------------------------
// Completion client
// ---------------------------------------------------------------------------

/// Build the completion client for `settings`, reading the API key from the
/// provider's environment variable.
pub fn build_completion(settings: &LlmSettings) -> Result<Arc<dyn Completion>> {
    let env_var = settings.api_key_env();
    let key = env_non_empty(env_var).unwrap_or_default();
    let client = LlmClient::new(settings.client_config(key))
        .with_context(|| format!("set {env_var} in the environment or in .env"))?;
    info!(
        provider = client.provider().name(),
        model = client.default_model(),
        "completion client ready"
    );
    Ok(Arc::new(client))
}

/// Stands in for the completion client when there is no knowledge base.
///
/// An inert controller never calls it, so no API key is needed.
struct NoKnowledge;

#[async_trait]
impl Completion for NoKnowledge {
    async fn complete(&self, _prompt: &str) -> factdesk_agent::Result<String> {
        Err(AgentError::MissingKnowledge)
    }
}

/// The completion client for `config`, checking the knowledge base first.
///
/// Without knowledge the widget is inert, so the provider key is not read
/// and a missing key is not an error.
pub fn completion_for(config: &AppConfig) -> Result<Arc<dyn Completion>> {
    if KnowledgeBase::new(config.knowledge.clone()).is_err() {
        warn!("no knowledge base configured: the widget will show a configuration error");
        return Ok(Arc::new(NoKnowledge));
    }
    build_completion(&config.llm)
}

// ---------------------------------------------------------------------------
// Env helpers
// ---------------------------------------------------------------------------

/// Read an environment variable, treating empty values as unset.
pub fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

//! Configuration module for the Taskhub Gateway
//!
//! Handles loading configuration from environment variables and config files.

use serde::Deserialize;
use std::sync::Arc;

use crate::models::Provider;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Upstream API configuration
    pub upstream: UpstreamConfig,
    /// OAuth provider configuration
    #[serde(default)]
    pub oauth: OAuthConfig,
    /// Session cookie configuration
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// Base URL for this server (used to compute the OAuth redirect URI)
    pub base_url: String,
    /// Whether the gateway runs behind HTTPS; controls the Secure cookie flag
    #[serde(default)]
    pub production: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the upstream task API; never exposed to the browser
    pub base_url: String,
    /// Timeout for upstream round-trips in seconds
    #[serde(default = "default_upstream_timeout")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OAuthConfig {
    pub google_client_id: Option<String>,
    pub kakao_client_id: Option<String>,
}

impl OAuthConfig {
    /// Client id registered with the given provider, if configured
    pub fn client_id(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::Google => self.google_client_id.as_deref(),
            Provider::Kakao => self.kakao_client_id.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Access cookie Max-Age in seconds; must not exceed the upstream
    /// access-token lifetime
    pub access_max_age_seconds: i64,
    /// Refresh cookie Max-Age in seconds
    pub refresh_max_age_seconds: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            access_max_age_seconds: 3600,
            refresh_max_age_seconds: 60 * 60 * 24 * 14,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_upstream_timeout() -> u64 {
    30
}

impl AppConfig {
    /// Load configuration from environment and config files
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            // Set defaults
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port())?
            .set_default("upstream.timeout_seconds", default_upstream_timeout())?
            // Load from config file if exists
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            // Override with environment variables (TASKHUB_ prefix)
            .add_source(
                config::Environment::with_prefix("TASKHUB")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub http_client: reqwest::Client,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, anyhow::Error> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("taskhub-gateway/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(config.upstream.timeout_seconds))
            .build()?;

        Ok(Self {
            config: Arc::new(config),
            http_client,
        })
    }
}

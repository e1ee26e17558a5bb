//! Runtime configuration structs
//!
//! Loads configuration from an optional `ampere.toml` file plus
//! `AMPERE_*` environment variables, with the environment winning.

use serde::Deserialize;

/// Main runtime configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeConfig {
    /// Bot token presented to the API and the gateway
    pub token: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Gateway URL override; discovered from the node when unset
    #[serde(default)]
    pub gateway_url: Option<String>,
    #[serde(default = "default_message_limit")]
    pub message_limit: usize,
    #[serde(default = "default_heartbeat_secs")]
    pub heartbeat_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

// Default value functions
fn default_api_url() -> String {
    "https://api.revolt.chat".to_string()
}

fn default_message_limit() -> usize {
    5000
}

fn default_heartbeat_secs() -> u64 {
    15
}

fn default_user_agent() -> String {
    concat!("Ampere/", env!("CARGO_PKG_VERSION")).to_string()
}

impl RuntimeConfig {
    /// Load configuration from `ampere.toml` and the environment
    ///
    /// # Errors
    /// Returns an error if no token is configured or a value fails to parse
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let settings = config::Config::builder()
            .add_source(config::File::with_name("ampere").required(false))
            .add_source(config::Environment::with_prefix("AMPERE"))
            .build()?;

        let loaded: Self = settings.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Build a configuration programmatically with all defaults
    pub fn from_token(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_url: default_api_url(),
            gateway_url: None,
            message_limit: default_message_limit(),
            heartbeat_secs: default_heartbeat_secs(),
            user_agent: default_user_agent(),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.token.trim().is_empty() {
            return Err(ConfigError::MissingToken);
        }
        if self.heartbeat_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "heartbeat_secs",
                "must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("No token configured (set AMPERE_TOKEN)")]
    MissingToken,

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),

    #[error("Failed to read configuration: {0}")]
    Source(#[from] config::ConfigError),
}

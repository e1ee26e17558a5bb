//! Client builder - fluent overrides on top of the runtime config

use std::time::Duration;

use ampere_common::RuntimeConfig;

use crate::client::Client;
use crate::error::ClientResult;

/// Assembles a [`Client`] from a token plus optional overrides
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    config: RuntimeConfig,
}

impl ClientBuilder {
    /// Start from a token with every other knob at its default
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            config: RuntimeConfig::from_token(token),
        }
    }

    /// Start from `ampere.toml` and `AMPERE_`-prefixed environment variables
    pub fn from_env() -> ClientResult<Self> {
        Ok(Self {
            config: RuntimeConfig::load()?,
        })
    }

    /// Point at a different API node
    #[must_use]
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    /// Connect the socket to a fixed URL instead of asking the node
    #[must_use]
    pub fn gateway_url(mut self, url: impl Into<String>) -> Self {
        self.config.gateway_url = Some(url.into());
        self
    }

    /// Cap the number of messages kept in the cache
    #[must_use]
    pub fn message_limit(mut self, limit: usize) -> Self {
        self.config.message_limit = limit;
        self
    }

    /// Interval between protocol-level pings, floored at one second
    #[must_use]
    pub fn heartbeat(mut self, interval: Duration) -> Self {
        self.config.heartbeat_secs = interval.as_secs().max(1);
        self
    }

    /// User agent presented to the API
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Construct the client with its transport, store, dispatcher, and gateway
    pub fn build(self) -> ClientResult<Client> {
        Client::from_config(self.config)
    }
}

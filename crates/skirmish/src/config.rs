//! Client configuration.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};
use url::Url;

/// Configuration for the console client.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Relay base URL, `ws://` or `wss://`.
    #[serde(default = "default_relay_url")]
    relay_url: String,
    /// Check distributed move payloads before applying them.
    #[serde(default = "default_verify_remote_moves")]
    verify_remote_moves: bool,
}

fn default_relay_url() -> String {
    "ws://localhost:8081".to_string()
}

fn default_verify_remote_moves() -> bool {
    true
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            relay_url: default_relay_url(),
            verify_remote_moves: default_verify_remote_moves(),
        }
    }
}

impl ClientConfig {
    /// Loads configuration from a TOML file. Missing fields take defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading client config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        info!(relay_url = %config.relay_url, "Client config loaded");
        Ok(config)
    }

    /// Returns a copy pointing at `relay_url`.
    pub fn with_relay_url(mut self, relay_url: impl Into<String>) -> Result<Self, ConfigError> {
        self.relay_url = relay_url.into();
        self.validate()?;
        Ok(self)
    }

    /// Returns a copy with remote move verification switched on or off.
    pub fn with_verify_remote_moves(mut self, verify: bool) -> Self {
        self.verify_remote_moves = verify;
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.relay_url)
            .map_err(|e| ConfigError::new(format!("Invalid relay_url {:?}: {}", self.relay_url, e)))?;
        match url.scheme() {
            "ws" | "wss" => Ok(()),
            other => Err(ConfigError::new(format!(
                "relay_url must use ws or wss, got {}",
                other
            ))),
        }
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

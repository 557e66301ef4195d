//! Server configuration.
//!
//! Sources, lowest precedence first: built-in defaults, a TOML file, the
//! `PORT` environment variable, command-line flags.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Environment variable overriding the listen port.
pub const PORT_VAR: &str = "PORT";

/// Settings for the WebSocket server.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind.
    #[serde(default = "default_host")]
    host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    port: u16,

    /// Path of the WebSocket endpoint.
    #[serde(default = "default_ws_path")]
    ws_path: String,

    /// Largest reassembled message accepted, in bytes.
    #[serde(default = "default_max_message_bytes")]
    max_message_bytes: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_ws_path() -> String {
    "/ws".to_string()
}

fn default_max_message_bytes() -> usize {
    4096
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            ws_path: default_ws_path(),
            max_message_bytes: default_max_message_bytes(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a TOML file. Missing keys take defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(port = config.port, ws_path = %config.ws_path, "Config loaded");
        Ok(config)
    }

    /// Defaults or `path`, then the environment.
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.with_port_var(std::env::var(PORT_VAR).ok().as_deref())
    }

    /// Applies a `PORT` value, if present.
    pub fn with_port_var(mut self, value: Option<&str>) -> Result<Self, ConfigError> {
        if let Some(value) = value {
            self.port = value.trim().parse().map_err(|e| {
                ConfigError::new(format!("Invalid {} value {:?}: {}", PORT_VAR, value, e))
            })?;
            debug!(port = self.port, "Port taken from environment");
        }
        Ok(self)
    }

    /// Applies command-line overrides.
    pub fn with_overrides(mut self, host: Option<String>, port: Option<u16>) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        self
    }

    /// Checks values that parse but cannot work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.ws_path.starts_with('/') {
            return Err(ConfigError::new(format!(
                "ws_path must start with '/', got {:?}",
                self.ws_path
            )));
        }
        if self.max_message_bytes == 0 {
            return Err(ConfigError::new(
                "max_message_bytes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// `host:port` for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
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
    /// Creates a new configuration error at the caller's location.
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

//! Configuration loading for the gateway.
//!
//! The canonical configuration lives in `vantage.yaml` at the project
//! root. This module defines strongly-typed structs mirroring the YAML
//! structure and a loader that reads the file; a missing file simply
//! yields the defaults. The database URL can always be overridden via
//! the `VANTAGE_DATABASE_URL` environment variable, which takes
//! precedence over the file.

use std::path::Path;

use serde::Deserialize;

/// Environment variable overriding the configured database URL.
pub const DATABASE_URL_ENV: &str = "VANTAGE_DATABASE_URL";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level gateway configuration.
///
/// Mirrors the structure of `vantage.yaml`. All fields have defaults, so
/// an absent file or an empty document is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GatewayConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerSection,

    /// Storage settings.
    #[serde(default)]
    pub database: DatabaseSection,
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSection {
    /// The host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// The TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Storage settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DatabaseSection {
    /// `PostgreSQL` connection URL. When absent, the gateway runs on the
    /// volatile in-memory store.
    #[serde(default)]
    pub url: Option<String>,
}

fn default_host() -> String {
    String::from("0.0.0.0")
}

const fn default_port() -> u16 {
    8080
}

impl GatewayConfig {
    /// Load configuration from a YAML file, falling back to defaults if
    /// the file does not exist, then apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but cannot be read or
    /// parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path)?;
            serde_yml::from_str(&raw)?
        } else {
            tracing::debug!(path = %path.display(), "No config file; using defaults");
            Self::default()
        };

        if let Ok(url) = std::env::var(DATABASE_URL_ENV) {
            if !url.is_empty() {
                config.database.url = Some(url);
            }
        }
        Ok(config)
    }
}

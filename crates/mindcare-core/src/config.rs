//! Portal configuration
//!
//! Values come from an optional TOML file, then environment variables
//! override them:
//!
//! | variable | field |
//! |---|---|
//! | `MINDCARE_GATEWAY_URL` | `gateway_url` |
//! | `MINDCARE_API_KEY` | `api_key` |
//! | `MINDCARE_SESSION_FILE` | `session_file` |
//! | `MINDCARE_LOG` | `log_filter` |

use mindcare_gateway::HttpGatewayConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const ENV_GATEWAY_URL: &str = "MINDCARE_GATEWAY_URL";
pub const ENV_API_KEY: &str = "MINDCARE_API_KEY";
pub const ENV_SESSION_FILE: &str = "MINDCARE_SESSION_FILE";
pub const ENV_LOG: &str = "MINDCARE_LOG";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required connection parameter is absent
    #[error("missing configuration value: {0}")]
    Missing(&'static str),

    /// Config file unreadable
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`PortalConfig`]
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A value is present but unusable
    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Portal configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// Gateway service endpoint
    pub gateway_url: Option<String>,
    /// Public API key for the gateway
    pub api_key: Option<String>,
    /// Where the signed-in session is kept between runs
    pub session_file: PathBuf,
    /// `tracing` filter directive
    pub log_filter: String,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl PortalConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn with_gateway_url(mut self, url: impl Into<String>) -> Self {
        self.gateway_url = Some(url.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_file = path.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    /// Parse a TOML document
    pub fn from_toml(raw: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from `path`, falling back to defaults when the file is absent,
    /// then apply the environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => match std::fs::read_to_string(path) {
                Ok(raw) => Self::from_toml(&raw, path)?,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    tracing::debug!(path = %path.display(), "config file not found, using defaults");
                    Self::default()
                }
                Err(source) => {
                    return Err(ConfigError::Read {
                        path: path.to_path_buf(),
                        source,
                    })
                }
            },
            None => Self::default(),
        };
        base.overlay(|key| std::env::var(key).ok())
    }

    /// Override fields from a variable lookup
    pub fn overlay<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = lookup(ENV_GATEWAY_URL) {
            self.gateway_url = Some(url);
        }
        if let Some(key) = lookup(ENV_API_KEY) {
            self.api_key = Some(key);
        }
        if let Some(path) = lookup(ENV_SESSION_FILE) {
            self.session_file = PathBuf::from(path);
        }
        if let Some(filter) = lookup(ENV_LOG) {
            self.log_filter = filter;
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "request_timeout_secs",
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(self)
    }

    /// Check the connection parameters are present
    pub fn validate(&self) -> Result<(), ConfigError> {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        if !present(&self.gateway_url) {
            return Err(ConfigError::Missing("gateway_url"));
        }
        if !present(&self.api_key) {
            return Err(ConfigError::Missing("api_key"));
        }
        Ok(())
    }

    /// Settings for the HTTP gateway
    pub fn gateway(&self) -> Result<HttpGatewayConfig, ConfigError> {
        self.validate()?;
        let url = self.gateway_url.clone().unwrap_or_default();
        let key = self.api_key.clone().unwrap_or_default();
        Ok(HttpGatewayConfig::new(url, key)
            .with_timeout(Duration::from_secs(self.request_timeout_secs))
            .with_session_file(self.session_file.clone()))
    }
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            gateway_url: None,
            api_key: None,
            session_file: PathBuf::from(".mindcare/session.json"),
            log_filter: "info".to_string(),
            request_timeout_secs: 30,
        }
    }
}

//! Configuration management for ragconsole
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, the backend URL environment variable, and CLI
//! overrides.

use crate::error::{Result, RagConsoleError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable that supplies the backend base URL
pub const API_URL_ENV: &str = "RAG_API_URL";

/// Loopback backend used when no base URL is configured
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Main configuration structure for ragconsole
///
/// Read once at session start and injected into the backend client and the
/// console; nothing in the core reads ambient process state afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Backend connection settings
    #[serde(default)]
    pub backend: BackendConfig,
    /// Interactive console settings
    #[serde(default)]
    pub console: ConsoleConfig,
}

/// RAG backend connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the backend serving `/chat`, `/ingest` and `/health`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_seconds() -> u64 {
    120
}

fn default_user_agent() -> String {
    format!("ragconsole/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
            user_agent: default_user_agent(),
        }
    }
}

impl BackendConfig {
    /// Request timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Interactive console configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Show the welcome banner when the console starts
    #[serde(default = "default_show_banner")]
    pub show_banner: bool,

    /// Maximum number of line-editor history entries
    #[serde(default = "default_history_size")]
    pub history_size: usize,
}

fn default_show_banner() -> bool {
    true
}

fn default_history_size() -> usize {
    500
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            show_banner: default_show_banner(),
            history_size: default_history_size(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// Precedence, lowest first: built-in defaults, the YAML file at `path`
    /// (skipped when missing), `RAG_API_URL`, `--api-url`.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::debug!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| RagConsoleError::Config(format!("Failed to read config file: {}", e)))?;
        Self::from_yaml(&contents)
    }

    /// Parse configuration from a YAML document
    ///
    /// # Examples
    ///
    /// ```
    /// use ragconsole::config::Config;
    ///
    /// let config = Config::from_yaml("backend:\n  base_url: http://rag.internal:9000\n").unwrap();
    /// assert_eq!(config.backend.base_url, "http://rag.internal:9000");
    /// assert_eq!(config.backend.timeout_seconds, 120);
    /// ```
    pub fn from_yaml(contents: &str) -> Result<Self> {
        serde_yaml::from_str(contents)
            .map_err(|e| RagConsoleError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var(API_URL_ENV) {
            if base_url.trim().is_empty() {
                tracing::warn!("Ignoring empty {}", API_URL_ENV);
            } else {
                tracing::debug!(base_url = %base_url, "Env override: {}", API_URL_ENV);
                self.backend.base_url = base_url;
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        match cli.api_url.as_deref().map(str::trim) {
            Some("") => tracing::warn!("Ignoring empty --api-url"),
            Some(api_url) => {
                tracing::debug!(base_url = %api_url, "CLI override: --api-url");
                self.backend.base_url = api_url.to_string();
            }
            None => {}
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is not an absolute http(s) URL, or if
    /// the timeout or history size is zero
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.backend.base_url).map_err(|e| {
            RagConsoleError::Config(format!(
                "Invalid backend base_url '{}': {}",
                self.backend.base_url, e
            ))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(RagConsoleError::Config(format!(
                "backend base_url must use http or https, got: {}",
                url.scheme()
            ))
            .into());
        }

        if self.backend.timeout_seconds == 0 {
            return Err(RagConsoleError::Config(
                "backend.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.console.history_size == 0 {
            return Err(RagConsoleError::Config(
                "console.history_size must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }
}

//! Configuration System
//!
//! Layered configuration for the tracking client: built-in defaults, the global
//! config file, `NOTIONFLOW__*` environment overrides, and finally the
//! `NOTION_TOKEN` / `NOTION_PARENT_PAGE_ID` credentials.

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use sources::env::{PARENT_PAGE_ENV, TOKEN_ENV};
pub use sources::global_file::global_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotionFlowConfig {
    /// Integration token for the workspace API
    #[serde(default)]
    pub auth: Option<String>,

    /// Page under which new run databases are created
    #[serde(default)]
    pub parent_page_id: Option<String>,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub poll: PollConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Workspace API endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_notion_version")]
    pub notion_version: String,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.notion.com/v1".to_string()
}

fn default_notion_version() -> String {
    "2022-06-28".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            notion_version: default_notion_version(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Readiness polling after database creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

fn default_max_attempts() -> u32 {
    10
}

fn default_interval_ms() -> u64 {
    1000
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            interval_ms: default_interval_ms(),
        }
    }
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Same attempt budget, no waiting between attempts
    pub fn immediate() -> Self {
        Self {
            interval_ms: 0,
            ..Self::default()
        }
    }
}

/// Object storage for run artifacts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Endpoint URL, e.g. `https://s3.eu-west-1.amazonaws.com`
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default)]
    pub bucket: Option<String>,

    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Signing region; falls back to `AWS_REGION`, then `us-east-1`
    #[serde(default)]
    pub region: Option<String>,
}

fn default_key_prefix() -> String {
    "artifacts".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            bucket: None,
            key_prefix: default_key_prefix(),
            region: None,
        }
    }
}

impl StorageConfig {
    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some() && self.bucket.is_some()
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    Api(String),
    Poll(String),
    Storage(String),
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigValidationError::Api(msg) => write!(f, "api: {}", msg),
            ConfigValidationError::Poll(msg) => write!(f, "poll: {}", msg),
            ConfigValidationError::Storage(msg) => write!(f, "storage: {}", msg),
        }
    }
}

impl std::error::Error for ConfigValidationError {}

impl NotionFlowConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ConfigValidationError>> {
        let mut errors = Vec::new();

        let base_url = &self.api.base_url;
        if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
            errors.push(ConfigValidationError::Api(format!(
                "base_url must be an absolute http(s) URL, got '{}'",
                base_url
            )));
        }
        if self.api.notion_version.trim().is_empty() {
            errors.push(ConfigValidationError::Api(
                "notion_version cannot be empty".to_string(),
            ));
        }
        if self.api.request_timeout_secs == 0 {
            errors.push(ConfigValidationError::Api(
                "request_timeout_secs must be positive".to_string(),
            ));
        }

        if self.poll.max_attempts == 0 {
            errors.push(ConfigValidationError::Poll(
                "max_attempts must be at least 1".to_string(),
            ));
        }

        if self.storage.endpoint.is_some() != self.storage.bucket.is_some() {
            errors.push(ConfigValidationError::Storage(
                "endpoint and bucket must be set together".to_string(),
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Copy with secrets masked, for display
    pub fn redacted(&self) -> Self {
        let mask = |secret: &Option<String>| secret.as_ref().map(|_| "********".to_string());
        let mut copy = self.clone();
        copy.auth = mask(&self.auth);
        copy
    }

    pub fn to_toml(&self) -> Result<String, crate::error::ApiError> {
        toml::to_string_pretty(self).map_err(|e| {
            crate::error::ApiError::Configuration(format!("Failed to render config: {}", e))
        })
    }
}

//! Error types for the NotionFlow experiment tracking client.
//!
//! Local validation failures (schema drift, unmapped types, misuse of the page stack)
//! get their own variants so callers can tell them apart from failures of the remote
//! workspace service, which are passed through unrecovered.

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, ApiError>;

/// Artifact storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Object store not configured: {0}")]
    NotConfigured(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Invalid artifact path: {0}")]
    InvalidPath(std::path::PathBuf),

    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Client errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Validation error: unknown {kind} type '{name}'")]
    UnknownFieldType { kind: &'static str, name: String },

    #[error("Validation error: property '{key}' holds {expected} values, got {actual}")]
    ValueTypeMismatch {
        key: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Key {key} not found in page {page_id}")]
    KeyNotFound { key: String, page_id: String },

    #[error("Unsupported property type '{field_type}' for {key}")]
    UnsupportedType { key: String, field_type: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No active page: call start_page first")]
    EmptyStack,

    #[error("No database selected: pass a database id or call set_database/create_database")]
    UnresolvedParent,

    #[error("Database not found: {0}")]
    DatabaseNotFound(String),

    #[error("Corrupt metric history in {key}: {reason}")]
    CorruptMetricHistory { key: String, reason: String },

    #[error("Remote request failed: {0}")]
    RemoteRequestFailed(String),

    #[error("Remote authentication failed: {0}")]
    RemoteAuthFailed(String),

    #[error("Remote rate limit exceeded: {0}")]
    RemoteRateLimit(String),

    #[error("Remote object not found: {0}")]
    RemoteNotFound(String),

    #[error("Remote error: {0}")]
    Remote(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ApiError {
    /// True for failures reported by (or on the way to) the workspace service.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            ApiError::RemoteRequestFailed(_)
                | ApiError::RemoteAuthFailed(_)
                | ApiError::RemoteRateLimit(_)
                | ApiError::RemoteNotFound(_)
                | ApiError::Remote(_)
        )
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::Configuration(err.to_string())
    }
}

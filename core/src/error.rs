//! Error types and handling for ghsearch core

use thiserror::Error;

/// Result type alias for ghsearch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for ghsearch core
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Search and API errors
    #[error(transparent)]
    Search(#[from] SearchError),

    /// Query or token validation errors
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Local storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for field '{field}': {value}")]
    InvalidValue { field: String, value: String },
}

/// Errors produced while searching.
///
/// These are cloneable so the orchestrator can publish them inside a
/// snapshot without giving up ownership.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("GitHub token is required. Please set it in the settings.")]
    MissingToken,

    #[error("Invalid GitHub token. Please check your token and try again.")]
    InvalidToken,

    #[error("API rate limit exceeded. Please wait {wait_seconds} seconds.")]
    RateLimit { wait_seconds: u64 },

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Request timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    #[error("Request cancelled")]
    Cancelled,

    #[error("{0}")]
    Validation(ValidationError),
}

impl SearchError {
    /// Network and timeout failures are the only ones worth retrying
    pub fn is_retryable(&self) -> bool {
        matches!(self, SearchError::Network { .. } | SearchError::Timeout { .. })
    }

    /// Whether this error represents a cancelled request
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SearchError::Cancelled)
    }

    /// Whether the user should be pointed at the token settings
    pub fn suggests_settings(&self) -> bool {
        match self {
            SearchError::MissingToken | SearchError::InvalidToken => true,
            SearchError::Api { status, message } => {
                *status == 401 || {
                    let lower = message.to_lowercase();
                    lower.contains("token") || lower.contains("bad credentials")
                }
            }
            _ => false,
        }
    }
}

/// Validation failures collected before any request is made
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", .errors.join("; "))]
pub struct ValidationError {
    pub errors: Vec<String>,
}

impl ValidationError {
    /// Create a validation error from a single message
    pub fn single(message: impl Into<String>) -> Self {
        Self {
            errors: vec![message.into()],
        }
    }
}

impl From<ValidationError> for SearchError {
    fn from(err: ValidationError) -> Self {
        SearchError::Validation(err)
    }
}

/// Local key-value storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to read store {path}: {message}")]
    ReadFailed { path: String, message: String },

    #[error("Failed to write store {path}: {message}")]
    WriteFailed { path: String, message: String },

    #[error("Invalid value stored under '{key}'")]
    InvalidValue { key: String },
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Generic(msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Generic(msg.to_string())
    }
}

//! Error types for mc2bq
//!
//! This module defines the error hierarchy for the entire exporter.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use crate::schema::SerializeError;
use thiserror::Error;

/// The main error type for mc2bq
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("invalid schema: {message}")]
    InvalidSchema { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Authentication Errors
    // ============================================================================
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    // ============================================================================
    // Remote API Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Serialization Errors
    // ============================================================================
    #[error(transparent)]
    Serialize(#[from] SerializeError),

    // ============================================================================
    // Destination Errors
    // ============================================================================
    #[error("table {table} already exists, use --force to force the data to be overwritten")]
    TableExists { table: String },

    #[error("load into {table} failed: {message}")]
    Load { table: String, message: String },

    #[error("Object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    // ============================================================================
    // Orchestration Errors
    // ============================================================================
    #[error("export {table}: {source}")]
    Export {
        table: String,
        #[source]
        source: Box<Error>,
    },

    #[error("operation cancelled")]
    Cancelled,

    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<Error>,
    },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid schema error
    pub fn invalid_schema(message: impl Into<String>) -> Self {
        Self::InvalidSchema {
            message: message.into(),
        }
    }

    /// Create an auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create a remote API error
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a load error
    pub fn load(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Load {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Wrap an error with the table it happened on
    pub fn in_table(self, table: impl Into<String>) -> Self {
        match self {
            // Cancellation is not attributable to a table
            Self::Cancelled => Self::Cancelled,
            other => Self::Export {
                table: table.into(),
                source: Box::new(other),
            },
        }
    }

    /// Wrap an error with a description of what was being done
    pub fn context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// HTTP status of a remote API error, if this is one
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Export { source, .. } | Error::Context { source, .. } => source.status(),
            _ => None,
        }
    }

    /// Check if this is a remote API error with the given status
    pub fn is_status(&self, status: u16) -> bool {
        self.status() == Some(status)
    }

    /// Check if this error is expected to resolve itself when retried
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Api { status, .. } => is_transient_status(*status),
            Error::Timeout { .. } => true,
            Error::Export { source, .. } | Error::Context { source, .. } => source.is_transient(),
            _ => false,
        }
    }

    /// Check if this error is a cancellation
    pub fn is_cancelled(&self) -> bool {
        match self {
            Error::Cancelled => true,
            Error::Export { source, .. } | Error::Context { source, .. } => source.is_cancelled(),
            _ => false,
        }
    }
}

/// Statuses worth retrying: rate limited, request timeout, internal error,
/// service unavailable and gateway timeout.
fn is_transient_status(status: u16) -> bool {
    matches!(status, 429 | 408 | 500 | 503 | 504)
}

/// Result type alias for mc2bq
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().context(message))
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| e.into().context(f()))
    }
}

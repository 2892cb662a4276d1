//! Core error type

use thiserror::Error;

/// Result type alias for free-bots operations
pub type FreebotsResult<T> = Result<T, FreebotsError>;

/// Main error type for the free-bots cache
#[derive(Error, Debug, Clone)]
pub enum FreebotsError {
    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        context: Option<String>,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        path: Option<String>,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {message}")]
    Json { message: String },

    /// HTTP request errors (transport failure, timeout or unexpected status)
    #[error("HTTP error: {message}")]
    Http {
        message: String,
        url: Option<String>,
        status_code: Option<u16>,
    },

    /// A cached token could not be decompressed
    #[error("Decode error: {message}")]
    Decode { message: String },

    /// The requested resource does not exist upstream
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    /// Persistent store errors
    #[error("Storage error: {message}")]
    Storage {
        message: String,
        context: Option<String>,
    },

    /// Invalid input errors
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        field: Option<String>,
    },

    /// Operation was cancelled
    #[error("Operation was cancelled")]
    Cancelled,

    /// Generic error
    #[error("Error: {message}")]
    Other { message: String },
}

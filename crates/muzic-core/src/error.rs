//! Error types for the Muzic client

use thiserror::Error;

/// Result type alias for Muzic operations
pub type MuzicResult<T> = Result<T, MuzicError>;

/// Main error type for the Muzic client
#[derive(Error, Debug)]
pub enum MuzicError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Authentication flow errors
    #[error("Authentication error: {0}")]
    Auth(#[from] crate::auth::AuthError),

    /// No usable access token is on record
    #[error("Not authenticated")]
    NotAuthenticated,

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(String),
}

impl MuzicError {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a new HTTP error
    pub fn http(message: impl Into<String>) -> Self {
        Self::Http(message.into())
    }
}

impl From<std::io::Error> for MuzicError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<serde_json::Error> for MuzicError {
    fn from(error: serde_json::Error) -> Self {
        Self::Json(error.to_string())
    }
}

impl From<reqwest::Error> for MuzicError {
    fn from(error: reqwest::Error) -> Self {
        Self::Http(error.to_string())
    }
}

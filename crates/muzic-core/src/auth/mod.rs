//! Authentication module for OAuth 2.0 + PKCE
//!
//! Provides:
//! - OAuth 2.0 authorization code flow with PKCE
//! - Token persistence, expiry detection and transparent refresh
//! - The session manager every data-fetching feature depends on

mod oauth;
mod pkce;
mod session;
mod store;
mod token;

#[cfg(test)]
mod session_tests;

pub use oauth::{OAuthClient, OAuthConfig};
pub use pkce::{CodeChallenge, CodeVerifier};
pub use session::{AuthSession, SessionManager};
pub use store::{AuthRecord, AuthStorage, FileStorage, MemoryStorage, TokenStore};
pub use token::TokenSet;

use thiserror::Error;

/// Result type alias for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Errors surfaced by the authentication layer.
///
/// Every session operation returns one of these explicitly rather than
/// panicking or hiding failures in free-text messages.
#[derive(Error, Debug, Clone)]
pub enum AuthError {
    /// Bad client id or redirect URI; fatal, not retried
    #[error("Invalid OAuth configuration: {0}")]
    Configuration(String),

    /// No code verifier on record when the callback arrived
    #[error("No code verifier on record; restart the login flow")]
    MissingVerifier,

    /// The callback URI carries no authorization code
    #[error("Callback URI carries no authorization code")]
    MalformedCallback,

    /// The token endpoint could not be reached or rejected the request
    #[error("Token exchange failed: {0}")]
    ExchangeFailed(String),

    /// Persistence layer failure
    #[error("Token storage error: {0}")]
    Storage(String),
}

impl AuthError {
    /// Create a new configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a new exchange error
    pub fn exchange(message: impl Into<String>) -> Self {
        Self::ExchangeFailed(message.into())
    }

    /// Create a new storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }
}

//! Token set issued by the provider's token endpoint

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// A complete set of credentials from one token-endpoint response.
///
/// Owned by the session manager; at most one set is persisted at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSet {
    /// Short-lived bearer credential for API calls
    pub access_token: String,
    /// Longer-lived credential used to mint new access tokens; the provider
    /// may omit it on refresh responses
    pub refresh_token: Option<String>,
    /// Absolute expiry instant, epoch milliseconds
    pub expires_at: i64,
    /// Space-separated scopes the provider granted
    pub scope: String,
}

impl TokenSet {
    /// Whether the access token has expired. Exact comparison: the token is
    /// usable strictly before `expires_at` and expired at or after it.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp_millis() >= self.expires_at
    }
}

/// Wire form of the token endpoint's JSON response.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[allow(dead_code)]
    pub token_type: String,
    /// Lifetime in seconds, relative to the moment the response was issued
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

impl From<TokenResponse> for TokenSet {
    fn from(response: TokenResponse) -> Self {
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            expires_at: Utc::now().timestamp_millis() + response.expires_in * 1000,
            scope: response.scope.unwrap_or_default(),
        }
    }
}

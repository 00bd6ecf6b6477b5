//! OAuth 2.0 client: authorize-URL construction and token-endpoint calls
//!
//! Supports:
//! - Authorization code flow with PKCE (public client, no secret)
//! - Token refresh
//!
//! No retry or backoff here; that policy belongs to the session manager.

use std::collections::HashMap;

use super::pkce::{CodeChallenge, CodeVerifier};
use super::token::{TokenResponse, TokenSet};
use super::{AuthError, AuthResult};

/// OAuth 2.0 provider configuration
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    /// Authorization endpoint URL
    pub authorization_endpoint: String,
    /// Token endpoint URL
    pub token_endpoint: String,
    /// Client ID
    pub client_id: String,
    /// Redirect URI the provider calls back to
    pub redirect_uri: String,
    /// Scopes to request
    pub scopes: Vec<String>,
}

impl OAuthConfig {
    /// Create a new OAuth config
    pub fn new(
        authorization_endpoint: impl Into<String>,
        token_endpoint: impl Into<String>,
        client_id: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            authorization_endpoint: authorization_endpoint.into(),
            token_endpoint: token_endpoint.into(),
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
            scopes: Vec::new(),
        }
    }

    /// Add multiple scopes
    pub fn with_scopes(mut self, scopes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.scopes.extend(scopes.into_iter().map(Into::into));
        self
    }
}

/// OAuth 2.0 client for one provider
pub struct OAuthClient {
    config: OAuthConfig,
    http_client: reqwest::Client,
}

impl OAuthClient {
    /// Create a new OAuth client
    pub fn new(config: OAuthConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    /// Build the authorization URL for a PKCE challenge.
    ///
    /// Pure function of config and challenge; presenting the URL to the
    /// user is the caller's job.
    pub fn authorization_url(&self, challenge: &CodeChallenge) -> String {
        let mut params = vec![
            ("response_type", "code".to_string()),
            ("client_id", self.config.client_id.clone()),
            ("redirect_uri", self.config.redirect_uri.clone()),
            ("code_challenge_method", CodeChallenge::method().to_string()),
            ("code_challenge", challenge.as_str().to_string()),
        ];

        if !self.config.scopes.is_empty() {
            params.push(("scope", self.config.scopes.join(" ")));
        }

        let query = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        format!("{}?{}", self.config.authorization_endpoint, query)
    }

    /// Exchange an authorization code for a token set.
    pub async fn exchange_code(
        &self,
        code: &str,
        verifier: &CodeVerifier,
    ) -> AuthResult<TokenSet> {
        let mut params = HashMap::new();
        params.insert("client_id", self.config.client_id.as_str());
        params.insert("grant_type", "authorization_code");
        params.insert("code", code);
        params.insert("redirect_uri", self.config.redirect_uri.as_str());
        params.insert("code_verifier", verifier.as_str());

        self.post_token_request(&params).await
    }

    /// Mint a new token set from a refresh token.
    pub async fn refresh(&self, refresh_token: &str) -> AuthResult<TokenSet> {
        let mut params = HashMap::new();
        params.insert("client_id", self.config.client_id.as_str());
        params.insert("grant_type", "refresh_token");
        params.insert("refresh_token", refresh_token);

        self.post_token_request(&params).await
    }

    async fn post_token_request(&self, params: &HashMap<&str, &str>) -> AuthResult<TokenSet> {
        let response = self
            .http_client
            .post(&self.config.token_endpoint)
            .form(params)
            .send()
            .await
            .map_err(|e| AuthError::exchange(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::exchange(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::exchange(format!("unparseable token response: {e}")))?;

        Ok(token_response.into())
    }
}

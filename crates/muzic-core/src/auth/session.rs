//! The authentication session manager
//!
//! Orchestrates PKCE generation, the authorize redirect, code exchange,
//! token persistence and transparent refresh into one login/refresh/logout
//! state machine. Constructed once at startup and shared by handle; every
//! data-fetching feature consults it before calling the Web API.

use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::oauth::OAuthClient;
use super::pkce::CodeVerifier;
use super::store::TokenStore;
use super::token::TokenSet;
use super::{AuthError, AuthResult};
use crate::api::UserProfile;

/// Snapshot of the current session, recomputed on demand
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub is_authenticated: bool,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user_profile: Option<UserProfile>,
    pub code_verifier: Option<String>,
}

/// The session manager
///
/// States, implicit in the persisted record: unauthenticated (nothing
/// stored), authenticating (a verifier is stored, awaiting the callback),
/// authenticated (a usable or refreshable token is on record).
pub struct SessionManager {
    oauth: OAuthClient,
    store: TokenStore,
    /// Serializes refreshes so concurrent expired callers trigger at most
    /// one network round-trip.
    refresh_lock: Mutex<()>,
}

impl SessionManager {
    /// Create a session manager over an OAuth client and token store
    pub fn new(oauth: OAuthClient, store: TokenStore) -> Self {
        Self {
            oauth,
            store,
            refresh_lock: Mutex::new(()),
        }
    }

    /// Begin the login flow: create and persist a verifier, derive its
    /// challenge and return the authorization URL.
    ///
    /// Opening the URL (browser, deep link) is the caller's job.
    pub async fn generate_auth_url(&self) -> AuthResult<String> {
        let verifier = CodeVerifier::generate();
        self.store.save_code_verifier(verifier.as_str()).await?;

        let url = self.oauth.authorization_url(&verifier.challenge());
        debug!("generated authorization URL, awaiting callback");
        Ok(url)
    }

    /// Complete the login flow from the provider's callback URI.
    ///
    /// Fails with [`AuthError::MissingVerifier`] if no verifier is on
    /// record and [`AuthError::MalformedCallback`] if the URI carries no
    /// `code` parameter. On success the token set is persisted and the
    /// verifier, now consumed, is dropped.
    pub async fn complete_authorization(&self, callback_uri: &str) -> AuthResult<TokenSet> {
        let verifier = self
            .store
            .code_verifier()
            .await?
            .ok_or(AuthError::MissingVerifier)?;
        let verifier = CodeVerifier::parse(verifier)?;

        let code = extract_code(callback_uri).ok_or(AuthError::MalformedCallback)?;

        let tokens = self.oauth.exchange_code(&code, &verifier).await?;
        self.persist_tokens(&tokens).await?;
        self.store.clear_code_verifier().await?;

        debug!("authorization complete, session authenticated");
        Ok(tokens)
    }

    /// Return a usable access token, refreshing once if the stored one has
    /// expired.
    ///
    /// `None` means the caller must re-authenticate: there is no token, no
    /// refresh token, or the refresh attempt failed. A failed refresh
    /// leaves the stored record untouched.
    pub async fn get_valid_access_token(&self) -> AuthResult<Option<String>> {
        let Some(access_token) = self.store.access_token().await? else {
            return Ok(None);
        };

        if !self.store.is_expired().await? {
            return Ok(Some(access_token));
        }

        let _guard = self.refresh_lock.lock().await;

        // Another caller may have refreshed while we waited for the guard
        if !self.store.is_expired().await? {
            return self.store.access_token().await;
        }

        let Some(refresh_token) = self.store.refresh_token().await? else {
            debug!("access token expired and no refresh token on record");
            return Ok(None);
        };

        match self.oauth.refresh(&refresh_token).await {
            Ok(tokens) => {
                self.persist_tokens(&tokens).await?;
                debug!("access token refreshed");
                Ok(Some(tokens.access_token))
            }
            Err(e) => {
                // Refresh failures surface as "no token", never as an error
                warn!("token refresh failed: {e}");
                Ok(None)
            }
        }
    }

    /// Whether a call to [`get_valid_access_token`](Self::get_valid_access_token)
    /// would return a token. Performs the same check and opportunistic
    /// refresh, never merely "a token exists".
    pub async fn is_authenticated(&self) -> AuthResult<bool> {
        Ok(self.get_valid_access_token().await?.is_some())
    }

    /// Clear all persisted auth state
    pub async fn logout(&self) -> AuthResult<()> {
        self.store.clear_all().await?;
        debug!("session cleared");
        Ok(())
    }

    /// Recompute the derived session snapshot
    pub async fn auth_session(&self) -> AuthResult<AuthSession> {
        Ok(AuthSession {
            is_authenticated: self.is_authenticated().await?,
            access_token: self.store.access_token().await?,
            refresh_token: self.store.refresh_token().await?,
            user_profile: self.store.user_profile().await?,
            code_verifier: self.store.code_verifier().await?,
        })
    }

    /// Replace the cached profile snapshot wholesale
    pub async fn cache_profile(&self, profile: &UserProfile) -> AuthResult<()> {
        self.store.save_user_profile(profile).await
    }

    /// The cached profile snapshot, if any
    pub async fn cached_profile(&self) -> AuthResult<Option<UserProfile>> {
        self.store.user_profile().await
    }

    /// Persist a token set. The refresh token is only overwritten when the
    /// provider sent a new one; an omitted refresh token on a refresh
    /// response must not erase the stored one.
    async fn persist_tokens(&self, tokens: &TokenSet) -> AuthResult<()> {
        self.store.save_access_token(&tokens.access_token).await?;
        if let Some(refresh_token) = &tokens.refresh_token {
            self.store.save_refresh_token(refresh_token).await?;
        }
        self.store.save_token_expiry(tokens.expires_at).await
    }
}

/// Extract the `code` query value from a callback URI: decode the whole URI
/// first, then take everything between `code=` and the next `&`.
fn extract_code(uri: &str) -> Option<String> {
    let decoded = urlencoding::decode(uri).ok()?;
    let start = decoded.find("code=")? + "code=".len();
    let rest = &decoded[start..];
    let code = match rest.find('&') {
        Some(end) => &rest[..end],
        None => rest,
    };
    (!code.is_empty()).then(|| code.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_code_followed_by_more_parameters() {
        assert_eq!(
            extract_code("muzic://callback?code=abc123&state=xyz").as_deref(),
            Some("abc123")
        );
    }

    #[test]
    fn extracts_code_at_end_of_uri() {
        assert_eq!(
            extract_code("muzic://callback?code=abc123").as_deref(),
            Some("abc123")
        );
    }

    #[test]
    fn decodes_before_scanning() {
        assert_eq!(
            extract_code("muzic%3A%2F%2Fcallback%3Fcode%3Dabc123%26state%3Dxyz").as_deref(),
            Some("abc123")
        );
    }

    #[test]
    fn rejects_uri_without_code() {
        assert_eq!(extract_code("muzic://callback?error=access_denied"), None);
        assert_eq!(extract_code("muzic://callback"), None);
        assert_eq!(extract_code("muzic://callback?code="), None);
    }
}

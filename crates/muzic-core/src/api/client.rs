//! Authenticated Web API client
//!
//! Every call asks the session manager for a valid token first; a `None`
//! answer surfaces as [`MuzicError::NotAuthenticated`], the universal
//! "re-login required" signal.

use std::sync::Arc;

use serde_json::json;
use tracing::debug;

use super::models::UserProfile;
use crate::auth::SessionManager;
use crate::error::{MuzicError, MuzicResult};

/// Client for the provider's Web API
pub struct WebApi {
    base_url: String,
    http_client: reqwest::Client,
    session: Arc<SessionManager>,
}

impl WebApi {
    /// Create a client rooted at the given API base URL
    pub fn new(base_url: impl Into<String>, session: Arc<SessionManager>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client: reqwest::Client::new(),
            session,
        }
    }

    async fn bearer_token(&self) -> MuzicResult<String> {
        self.session
            .get_valid_access_token()
            .await?
            .ok_or(MuzicError::NotAuthenticated)
    }

    /// Fetch the current user's profile and replace the cached snapshot.
    pub async fn current_user_profile(&self) -> MuzicResult<UserProfile> {
        let token = self.bearer_token().await?;

        let response = self
            .http_client
            .get(format!("{}/me", self.base_url))
            .bearer_auth(&token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MuzicError::http(format!(
                "profile request returned {status}"
            )));
        }

        let profile: UserProfile = response.json().await?;
        self.session.cache_profile(&profile).await?;
        debug!(user = %profile.id, "profile snapshot updated");
        Ok(profile)
    }

    /// Start playback of a single URI on the user's active device.
    pub async fn play(&self, uri: &str) -> MuzicResult<()> {
        let token = self.bearer_token().await?;

        let response = self
            .http_client
            .put(format!("{}/me/player/play", self.base_url))
            .bearer_auth(&token)
            .json(&json!({ "uris": [uri] }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MuzicError::http(format!("play request returned {status}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::auth::{MemoryStorage, OAuthClient, OAuthConfig, TokenStore};

    async fn authenticated_session() -> Arc<SessionManager> {
        let store = TokenStore::new(Box::new(MemoryStorage::new()));
        store.save_access_token("access-1").await.unwrap();
        store
            .save_token_expiry(Utc::now().timestamp_millis() + 3600 * 1000)
            .await
            .unwrap();

        Arc::new(SessionManager::new(
            OAuthClient::new(OAuthConfig::new(
                "https://accounts.example.com/authorize",
                "http://127.0.0.1:1/api/token",
                "test_client",
                "muzic://callback",
            )),
            store,
        ))
    }

    #[tokio::test]
    async fn profile_fetch_sends_bearer_and_caches_snapshot() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me"))
            .and(header("authorization", "Bearer access-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "user-1",
                "display_name": "Listener"
            })))
            .mount(&server)
            .await;

        let session = authenticated_session().await;
        let api = WebApi::new(server.uri(), Arc::clone(&session));

        let profile = api.current_user_profile().await.unwrap();
        assert_eq!(profile.id, "user-1");

        let cached = session.cached_profile().await.unwrap().unwrap();
        assert_eq!(cached.display_name.as_deref(), Some("Listener"));
    }

    #[tokio::test]
    async fn requests_without_a_session_fail_as_not_authenticated() {
        let store = TokenStore::new(Box::new(MemoryStorage::new()));
        let session = Arc::new(SessionManager::new(
            OAuthClient::new(OAuthConfig::new(
                "https://accounts.example.com/authorize",
                "http://127.0.0.1:1/api/token",
                "test_client",
                "muzic://callback",
            )),
            store,
        ));

        let api = WebApi::new("http://127.0.0.1:1", session);
        let result = api.current_user_profile().await;
        assert!(matches!(result, Err(MuzicError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn play_puts_a_single_uri() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/me/player/play"))
            .and(body_json(json!({ "uris": ["spotify:track:abc"] })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let session = authenticated_session().await;
        let api = WebApi::new(server.uri(), session);
        api.play("spotify:track:abc").await.unwrap();
    }
}

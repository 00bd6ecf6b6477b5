//! Session manager tests against a mock token endpoint

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::auth::{
        AuthError, FileStorage, OAuthClient, OAuthConfig, SessionManager, TokenStore,
    };

    fn oauth_client(token_endpoint: &str) -> OAuthClient {
        OAuthClient::new(
            OAuthConfig::new(
                "https://accounts.example.com/authorize",
                token_endpoint,
                "test_client",
                "muzic://callback",
            )
            .with_scopes(["user-read-private"]),
        )
    }

    fn session_at(dir: &std::path::Path, token_endpoint: &str) -> SessionManager {
        SessionManager::new(
            oauth_client(token_endpoint),
            TokenStore::new(Box::new(FileStorage::new(dir))),
        )
    }

    /// Second store over the same directory, for observing persisted state
    fn inspect(dir: &std::path::Path) -> TokenStore {
        TokenStore::new(Box::new(FileStorage::new(dir)))
    }

    fn token_response(access_token: &str, refresh_token: Option<&str>) -> ResponseTemplate {
        let mut body = json!({
            "access_token": access_token,
            "token_type": "Bearer",
            "expires_in": 3600,
            "scope": "user-read-private"
        });
        if let Some(refresh_token) = refresh_token {
            body["refresh_token"] = json!(refresh_token);
        }
        ResponseTemplate::new(200).set_body_json(body)
    }

    #[tokio::test]
    async fn complete_authorization_without_verifier_fails() {
        let dir = tempfile::tempdir().unwrap();
        let session = session_at(dir.path(), "https://accounts.example.com/api/token");

        // Independent of callback validity: even a well-formed callback is
        // rejected when no verifier was ever saved
        let result = session
            .complete_authorization("muzic://callback?code=abc123")
            .await;
        assert!(matches!(result, Err(AuthError::MissingVerifier)));

        let result = session.complete_authorization("not a uri").await;
        assert!(matches!(result, Err(AuthError::MissingVerifier)));
    }

    #[tokio::test]
    async fn complete_authorization_without_code_fails() {
        let dir = tempfile::tempdir().unwrap();
        let session = session_at(dir.path(), "https://accounts.example.com/api/token");

        session.generate_auth_url().await.unwrap();

        let result = session
            .complete_authorization("muzic://callback?error=access_denied")
            .await;
        assert!(matches!(result, Err(AuthError::MalformedCallback)));
    }

    #[tokio::test]
    async fn auth_url_embeds_challenge_of_stored_verifier() {
        let dir = tempfile::tempdir().unwrap();
        let session = session_at(dir.path(), "https://accounts.example.com/api/token");

        let url = session.generate_auth_url().await.unwrap();

        let stored = inspect(dir.path()).code_verifier().await.unwrap().unwrap();
        let challenge = crate::auth::CodeVerifier::parse(stored)
            .unwrap()
            .challenge();

        assert!(url.contains("code_challenge_method=S256"));
        assert!(url.contains(&format!("code_challenge={}", challenge.as_str())));
    }

    #[tokio::test]
    async fn full_authorization_flow_persists_tokens_and_consumes_verifier() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=abc123"))
            .and(body_string_contains("code_verifier="))
            .respond_with(token_response("access-1", Some("refresh-1")))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let session = session_at(dir.path(), &format!("{}/api/token", server.uri()));

        session.generate_auth_url().await.unwrap();
        let tokens = session
            .complete_authorization("muzic://callback?code=abc123&state=xyz")
            .await
            .unwrap();

        assert_eq!(tokens.access_token, "access-1");

        let store = inspect(dir.path());
        assert_eq!(store.access_token().await.unwrap().as_deref(), Some("access-1"));
        assert_eq!(
            store.refresh_token().await.unwrap().as_deref(),
            Some("refresh-1")
        );
        assert!(store.token_expiry().await.unwrap() > Utc::now().timestamp_millis());
        // The verifier is single-use and was consumed by the exchange
        assert_eq!(store.code_verifier().await.unwrap(), None);
    }

    #[tokio::test]
    async fn failed_exchange_surfaces_as_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant"
            })))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let session = session_at(dir.path(), &format!("{}/api/token", server.uri()));

        session.generate_auth_url().await.unwrap();
        let result = session
            .complete_authorization("muzic://callback?code=abc123")
            .await;
        assert!(matches!(result, Err(AuthError::ExchangeFailed(_))));
    }

    #[tokio::test]
    async fn valid_token_is_returned_without_refresh() {
        let dir = tempfile::tempdir().unwrap();
        let store = inspect(dir.path());
        store.save_access_token("access-1").await.unwrap();
        store
            .save_token_expiry(Utc::now().timestamp_millis() + 3600 * 1000)
            .await
            .unwrap();

        // Unroutable token endpoint: any refresh attempt would fail loudly
        let session = session_at(dir.path(), "http://127.0.0.1:1/api/token");
        assert_eq!(
            session.get_valid_access_token().await.unwrap().as_deref(),
            Some("access-1")
        );
        assert!(session.is_authenticated().await.unwrap());
    }

    #[tokio::test]
    async fn expired_token_is_refreshed_and_persisted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=refresh-1"))
            .respond_with(token_response("access-2", None))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let store = inspect(dir.path());
        store.save_access_token("access-1").await.unwrap();
        store.save_refresh_token("refresh-1").await.unwrap();
        store.save_token_expiry(1).await.unwrap();

        let session = session_at(dir.path(), &format!("{}/api/token", server.uri()));
        let before = Utc::now().timestamp_millis();
        assert_eq!(
            session.get_valid_access_token().await.unwrap().as_deref(),
            Some("access-2")
        );

        assert_eq!(store.access_token().await.unwrap().as_deref(), Some("access-2"));
        assert!(store.token_expiry().await.unwrap() >= before + 3600 * 1000);
        // The refresh response omitted a refresh token; the stored one is
        // retained for the next cycle
        assert_eq!(
            store.refresh_token().await.unwrap().as_deref(),
            Some("refresh-1")
        );
    }

    #[tokio::test]
    async fn failed_refresh_returns_none_and_keeps_stored_state() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant"
            })))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let store = inspect(dir.path());
        store.save_access_token("access-1").await.unwrap();
        store.save_refresh_token("refresh-1").await.unwrap();
        store.save_token_expiry(1).await.unwrap();

        let session = session_at(dir.path(), &format!("{}/api/token", server.uri()));
        assert_eq!(session.get_valid_access_token().await.unwrap(), None);
        assert!(!session.is_authenticated().await.unwrap());

        // The failed refresh erased nothing
        assert_eq!(store.access_token().await.unwrap().as_deref(), Some("access-1"));
        assert_eq!(
            store.refresh_token().await.unwrap().as_deref(),
            Some("refresh-1")
        );
    }

    #[tokio::test]
    async fn expired_token_without_refresh_token_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = inspect(dir.path());
        store.save_access_token("access-1").await.unwrap();
        store.save_token_expiry(1).await.unwrap();

        let session = session_at(dir.path(), "http://127.0.0.1:1/api/token");
        assert_eq!(session.get_valid_access_token().await.unwrap(), None);
    }

    #[tokio::test]
    async fn concurrent_expired_callers_share_one_refresh() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(token_response("access-2", None))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let store = inspect(dir.path());
        store.save_access_token("access-1").await.unwrap();
        store.save_refresh_token("refresh-1").await.unwrap();
        store.save_token_expiry(1).await.unwrap();

        let session = Arc::new(session_at(
            dir.path(),
            &format!("{}/api/token", server.uri()),
        ));

        let tasks: Vec<_> = (0..4)
            .map(|_| {
                let session = Arc::clone(&session);
                tokio::spawn(async move { session.get_valid_access_token().await.unwrap() })
            })
            .collect();

        // Every caller ends with a usable token; last-write-wins persistence
        // means the store holds the refreshed set
        for task in tasks {
            assert!(task.await.unwrap().is_some());
        }
        assert_eq!(store.access_token().await.unwrap().as_deref(), Some("access-2"));
        // expect(1) on the mock verifies the single-flight guard on drop
    }

    #[tokio::test]
    async fn logout_clears_all_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = inspect(dir.path());
        store.save_access_token("access-1").await.unwrap();
        store.save_refresh_token("refresh-1").await.unwrap();
        store
            .save_token_expiry(Utc::now().timestamp_millis() + 3600 * 1000)
            .await
            .unwrap();

        let session = session_at(dir.path(), "http://127.0.0.1:1/api/token");
        session.logout().await.unwrap();

        assert_eq!(store.access_token().await.unwrap(), None);
        assert_eq!(store.refresh_token().await.unwrap(), None);
        assert_eq!(store.token_expiry().await.unwrap(), 0);
        assert_eq!(session.get_valid_access_token().await.unwrap(), None);
    }

    #[tokio::test]
    async fn auth_session_snapshot_reflects_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = inspect(dir.path());
        store.save_access_token("access-1").await.unwrap();
        store.save_refresh_token("refresh-1").await.unwrap();
        store
            .save_token_expiry(Utc::now().timestamp_millis() + 3600 * 1000)
            .await
            .unwrap();

        let session = session_at(dir.path(), "http://127.0.0.1:1/api/token");
        let snapshot = session.auth_session().await.unwrap();

        assert!(snapshot.is_authenticated);
        assert_eq!(snapshot.access_token.as_deref(), Some("access-1"));
        assert_eq!(snapshot.refresh_token.as_deref(), Some("refresh-1"));
        assert!(snapshot.user_profile.is_none());
        assert!(snapshot.code_verifier.is_none());
    }
}

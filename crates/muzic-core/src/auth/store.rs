//! Secure persistence for the authentication session
//!
//! One record holds everything the session owns: tokens, expiry, the cached
//! user profile and the in-flight PKCE verifier. A backend trait abstracts
//! where the record lives; the store serializes access so concurrent
//! readers and writers never observe a partial write.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::{AuthError, AuthResult};
use crate::api::UserProfile;

/// The persisted auth-domain record. Every field is optional; absence means
/// "never authenticated" or "mid-flow", never an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Absolute expiry instant, epoch milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_expiry: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_profile: Option<UserProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_verifier: Option<String>,
}

/// Storage backend for the auth record
#[async_trait]
pub trait AuthStorage: Send + Sync {
    /// Load the record; a missing record is the empty record
    async fn load(&self) -> AuthResult<AuthRecord>;

    /// Persist the record, replacing any previous one
    async fn persist(&self, record: &AuthRecord) -> AuthResult<()>;

    /// Remove the record entirely
    async fn clear(&self) -> AuthResult<()>;
}

/// File-backed storage: one JSON record under the store directory.
///
/// The directory is created 0700 and the record file 0600 on Unix; the
/// token record is a credential and must not be world-readable.
pub struct FileStorage {
    record_path: PathBuf,
}

impl FileStorage {
    /// Create storage rooted at the given directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            record_path: dir.into().join("auth.json"),
        }
    }

    /// Default location under the user's home directory (`~/.muzic`)
    pub fn default_location() -> AuthResult<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| AuthError::storage("cannot determine home directory"))?;
        Ok(Self::new(home.join(".muzic")))
    }

    async fn ensure_parent_dir(&self) -> AuthResult<()> {
        let Some(dir) = self.record_path.parent() else {
            return Ok(());
        };

        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| AuthError::storage(format!("creating {}: {e}", dir.display())))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(dir, std::fs::Permissions::from_mode(0o700))
                .await
                .map_err(|e| AuthError::storage(format!("securing {}: {e}", dir.display())))?;
        }

        Ok(())
    }
}

#[async_trait]
impl AuthStorage for FileStorage {
    async fn load(&self) -> AuthResult<AuthRecord> {
        let content = match tokio::fs::read(&self.record_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(AuthRecord::default());
            }
            Err(e) => {
                return Err(AuthError::storage(format!(
                    "reading {}: {e}",
                    self.record_path.display()
                )));
            }
        };

        serde_json::from_slice(&content)
            .map_err(|e| AuthError::storage(format!("corrupt auth record: {e}")))
    }

    async fn persist(&self, record: &AuthRecord) -> AuthResult<()> {
        self.ensure_parent_dir().await?;

        let content = serde_json::to_vec_pretty(record)
            .map_err(|e| AuthError::storage(format!("serializing auth record: {e}")))?;

        tokio::fs::write(&self.record_path, content)
            .await
            .map_err(|e| {
                AuthError::storage(format!("writing {}: {e}", self.record_path.display()))
            })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&self.record_path, std::fs::Permissions::from_mode(0o600))
                .await
                .map_err(|e| {
                    AuthError::storage(format!("securing {}: {e}", self.record_path.display()))
                })?;
        }

        Ok(())
    }

    async fn clear(&self) -> AuthResult<()> {
        match tokio::fs::remove_file(&self.record_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AuthError::storage(format!(
                "removing {}: {e}",
                self.record_path.display()
            ))),
        }
    }
}

/// In-memory storage for tests and ephemeral sessions
#[derive(Default)]
pub struct MemoryStorage {
    record: Mutex<AuthRecord>,
}

impl MemoryStorage {
    /// Create empty in-memory storage
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuthStorage for MemoryStorage {
    async fn load(&self) -> AuthResult<AuthRecord> {
        Ok(self.record.lock().await.clone())
    }

    async fn persist(&self, record: &AuthRecord) -> AuthResult<()> {
        *self.record.lock().await = record.clone();
        Ok(())
    }

    async fn clear(&self) -> AuthResult<()> {
        *self.record.lock().await = AuthRecord::default();
        Ok(())
    }
}

/// Asynchronous token store scoped to the auth domain.
///
/// Reads and writes are independently awaitable; the internal lock makes
/// every read-modify-write of the record atomic with respect to other
/// store calls on the same session.
pub struct TokenStore {
    backend: Box<dyn AuthStorage>,
    lock: Mutex<()>,
}

impl TokenStore {
    /// Create a store over the given backend
    pub fn new(backend: Box<dyn AuthStorage>) -> Self {
        Self {
            backend,
            lock: Mutex::new(()),
        }
    }

    /// Create a store over file storage at the default location
    pub fn with_default_storage() -> AuthResult<Self> {
        Ok(Self::new(Box::new(FileStorage::default_location()?)))
    }

    async fn update<F>(&self, mutate: F) -> AuthResult<()>
    where
        F: FnOnce(&mut AuthRecord),
    {
        let _guard = self.lock.lock().await;
        let mut record = self.backend.load().await?;
        mutate(&mut record);
        self.backend.persist(&record).await
    }

    async fn read(&self) -> AuthResult<AuthRecord> {
        let _guard = self.lock.lock().await;
        self.backend.load().await
    }

    /// Save the access token
    pub async fn save_access_token(&self, token: &str) -> AuthResult<()> {
        let token = token.to_string();
        self.update(|record| record.access_token = Some(token)).await
    }

    /// Get the access token, if set
    pub async fn access_token(&self) -> AuthResult<Option<String>> {
        Ok(self.read().await?.access_token)
    }

    /// Save the refresh token
    pub async fn save_refresh_token(&self, token: &str) -> AuthResult<()> {
        let token = token.to_string();
        self.update(|record| record.refresh_token = Some(token)).await
    }

    /// Get the refresh token, if set
    pub async fn refresh_token(&self) -> AuthResult<Option<String>> {
        Ok(self.read().await?.refresh_token)
    }

    /// Save the absolute token expiry (epoch milliseconds)
    pub async fn save_token_expiry(&self, expiry: i64) -> AuthResult<()> {
        self.update(|record| record.token_expiry = Some(expiry)).await
    }

    /// Get the token expiry; an unset expiry reads as 0
    pub async fn token_expiry(&self) -> AuthResult<i64> {
        Ok(self.read().await?.token_expiry.unwrap_or(0))
    }

    /// Save the cached user profile, replacing any previous snapshot
    pub async fn save_user_profile(&self, profile: &UserProfile) -> AuthResult<()> {
        let profile = profile.clone();
        self.update(|record| record.user_profile = Some(profile)).await
    }

    /// Get the cached user profile, if set
    pub async fn user_profile(&self) -> AuthResult<Option<UserProfile>> {
        Ok(self.read().await?.user_profile)
    }

    /// Save the in-flight PKCE code verifier
    pub async fn save_code_verifier(&self, verifier: &str) -> AuthResult<()> {
        let verifier = verifier.to_string();
        self.update(|record| record.code_verifier = Some(verifier)).await
    }

    /// Get the in-flight PKCE code verifier, if set
    pub async fn code_verifier(&self) -> AuthResult<Option<String>> {
        Ok(self.read().await?.code_verifier)
    }

    /// Drop the PKCE code verifier once it has been consumed
    pub async fn clear_code_verifier(&self) -> AuthResult<()> {
        self.update(|record| record.code_verifier = None).await
    }

    /// Clear every persisted auth field
    pub async fn clear_all(&self) -> AuthResult<()> {
        let _guard = self.lock.lock().await;
        self.backend.clear().await
    }

    /// Whether the stored token has expired. An unset expiry counts as
    /// expired; the token is usable strictly before the expiry instant.
    pub async fn is_expired(&self) -> AuthResult<bool> {
        let expiry = self.token_expiry().await?;
        Ok(Utc::now().timestamp_millis() >= expiry)
    }
}

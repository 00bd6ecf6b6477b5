//! Application configuration
//!
//! Precedence: built-in defaults, then the TOML config file, then
//! `MUZIC_*` environment variables.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{MuzicError, MuzicResult};

/// Spotify account-service authorize endpoint
pub const DEFAULT_AUTHORIZE_URL: &str = "https://accounts.spotify.com/authorize";
/// Spotify account-service token endpoint
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
/// Spotify Web API base
pub const DEFAULT_API_BASE_URL: &str = "https://api.spotify.com/v1";

/// Scopes requested at login
const DEFAULT_SCOPES: &[&str] = &[
    "user-read-private",
    "user-read-email",
    "user-read-recently-played",
    "user-top-read",
    "user-read-playback-state",
    "user-modify-playback-state",
    "playlist-read-private",
    "playlist-read-collaborative",
    "user-library-read",
];

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// OAuth client ID registered with the provider
    pub client_id: String,
    /// Redirect URI the provider calls back to (custom scheme deep link)
    pub redirect_uri: String,
    /// Scopes requested at login
    pub scopes: Vec<String>,
    /// Authorization endpoint
    pub authorize_url: String,
    /// Token endpoint
    pub token_url: String,
    /// Web API base URL
    pub api_base_url: String,
    /// Directory for the persisted token record; defaults to `~/.muzic`
    pub store_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            redirect_uri: "muzic://callback".to_string(),
            scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
            authorize_url: DEFAULT_AUTHORIZE_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            store_dir: None,
        }
    }
}

impl AppConfig {
    /// Load configuration: defaults, overlaid by the file (when present),
    /// overlaid by environment variables.
    pub fn load(config_file: impl AsRef<Path>) -> MuzicResult<Self> {
        let path = config_file.as_ref();
        let mut config = if path.exists() {
            Self::load_from_file(path)?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(path: impl AsRef<Path>) -> MuzicResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| MuzicError::config(format!("reading {}: {e}", path.display())))?;
        toml::from_str(&content)
            .map_err(|e| MuzicError::config(format!("parsing {}: {e}", path.display())))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(client_id) = std::env::var("MUZIC_CLIENT_ID") {
            self.client_id = client_id;
        }
        if let Ok(redirect_uri) = std::env::var("MUZIC_REDIRECT_URI") {
            self.redirect_uri = redirect_uri;
        }
        if let Ok(store_dir) = std::env::var("MUZIC_STORE_DIR") {
            self.store_dir = Some(PathBuf::from(store_dir));
        }
    }

    /// Validate the configuration. Failures are fatal, never retried.
    pub fn validate(&self) -> MuzicResult<()> {
        if self.client_id.is_empty() {
            return Err(MuzicError::config(
                "client_id is not set (config file or MUZIC_CLIENT_ID)",
            ));
        }
        if !self.redirect_uri.contains("://") {
            return Err(MuzicError::config(format!(
                "redirect_uri '{}' has no scheme",
                self.redirect_uri
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_target_the_provider_endpoints() {
        let config = AppConfig::default();
        assert_eq!(config.authorize_url, DEFAULT_AUTHORIZE_URL);
        assert_eq!(config.token_url, DEFAULT_TOKEN_URL);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.scopes.len(), 9);
    }

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
client_id = "file_client"
redirect_uri = "custom://auth"
"#
        )
        .unwrap();

        let config = AppConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.client_id, "file_client");
        assert_eq!(config.redirect_uri, "custom://auth");
        // Unspecified fields keep their defaults
        assert_eq!(config.token_url, DEFAULT_TOKEN_URL);
    }

    #[test]
    fn validation_names_the_offending_field() {
        let config = AppConfig::default();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("client_id"));

        let config = AppConfig {
            client_id: "client".to_string(),
            redirect_uri: "no-scheme".to_string(),
            ..AppConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("redirect_uri"));

        let config = AppConfig {
            client_id: "client".to_string(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn env_overrides_beat_file_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"client_id = "file_client""#).unwrap();

        std::env::set_var("MUZIC_CLIENT_ID", "env_client");
        let config = AppConfig::load(file.path()).unwrap();
        std::env::remove_var("MUZIC_CLIENT_ID");

        assert_eq!(config.client_id, "env_client");
    }
}

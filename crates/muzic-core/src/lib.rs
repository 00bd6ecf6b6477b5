//! Muzic Core Library
//!
//! This crate provides the core functionality for the Muzic streaming
//! client: the OAuth 2.0 + PKCE authentication session manager, a minimal
//! Web API client, and configuration loading.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;

// Re-export commonly used types
pub use api::{UserProfile, WebApi};
pub use auth::{AuthError, AuthResult, AuthSession, SessionManager, TokenSet, TokenStore};
pub use config::AppConfig;
pub use error::{MuzicError, MuzicResult};

//! PKCE (Proof Key for Code Exchange) primitives
//!
//! RFC 7636: https://tools.ietf.org/html/rfc7636

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::RngCore;
use sha2::{Digest, Sha256};

use super::{AuthError, AuthResult};

/// Number of random octets fed into the verifier. 32 bytes encode to 43
/// base64url characters, the RFC minimum.
const VERIFIER_OCTETS: usize = 32;

/// PKCE code verifier
///
/// Single-use secret: created when the authorization URL is generated and
/// consumed by the code exchange.
#[derive(Debug, Clone)]
pub struct CodeVerifier {
    verifier: String,
}

impl CodeVerifier {
    /// Generate a fresh verifier from cryptographically secure random bytes.
    pub fn generate() -> Self {
        let mut bytes = [0u8; VERIFIER_OCTETS];
        // The verifier must come from a cryptographically secure source;
        // thread_rng is a CSPRNG.
        rand::thread_rng().fill_bytes(&mut bytes);

        Self {
            verifier: URL_SAFE_NO_PAD.encode(bytes),
        }
    }

    /// Reconstruct a verifier from a persisted string, re-validating the
    /// RFC 7636 length and charset constraints.
    pub fn parse(verifier: impl Into<String>) -> AuthResult<Self> {
        let verifier = verifier.into();

        if verifier.len() < 43 || verifier.len() > 128 {
            return Err(AuthError::configuration(format!(
                "code verifier length {} outside 43-128",
                verifier.len()
            )));
        }

        // Unreserved URI characters only
        if !verifier
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.' || c == '_' || c == '~')
        {
            return Err(AuthError::configuration(
                "code verifier contains non-unreserved characters",
            ));
        }

        Ok(Self { verifier })
    }

    /// Get the verifier string
    pub fn as_str(&self) -> &str {
        &self.verifier
    }

    /// Derive the S256 challenge for this verifier
    pub fn challenge(&self) -> CodeChallenge {
        CodeChallenge::derive(self)
    }
}

/// PKCE code challenge: base64url-encoded SHA-256 digest of the verifier.
///
/// Derived deterministically, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeChallenge {
    challenge: String,
}

impl CodeChallenge {
    /// Derive a challenge from a verifier using the S256 method
    pub fn derive(verifier: &CodeVerifier) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(verifier.as_str().as_bytes());
        let digest = hasher.finalize();

        Self {
            challenge: URL_SAFE_NO_PAD.encode(digest),
        }
    }

    /// Get the challenge string
    pub fn as_str(&self) -> &str {
        &self.challenge
    }

    /// The challenge method sent to the provider. Plain-text challenges are
    /// not supported.
    pub const fn method() -> &'static str {
        "S256"
    }
}

//! Backend credentials carried by the browser session.

mod extractor;

use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};

pub use extractor::{AuthError, BackendSession};

/// Credentials forwarded to the Django backend on every request.
///
/// # Security features
/// - `Debug` prints `[REDACTED]` instead of the actual values
/// - Memory is zeroed when dropped (via `zeroize`)
/// - Explicit `.expose_secret()` required to access the values
#[derive(Clone)]
pub enum Credentials {
    /// Django session cookies (server-rendered deployment).
    Session {
        session_id: SecretString,
        csrf_token: Option<SecretString>,
    },
    /// Backend access token issued through the OAuth session provider.
    Bearer(SecretString),
}

impl Credentials {
    pub fn session(session_id: impl Into<String>, csrf_token: Option<String>) -> Self {
        Self::Session {
            session_id: SecretString::from(session_id.into()),
            csrf_token: csrf_token.map(SecretString::from),
        }
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer(SecretString::from(token.into()))
    }

    /// Short label for logs, never the credential itself.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Session { .. } => "session",
            Self::Bearer(_) => "bearer",
        }
    }

    /// Stable SHA-256 fingerprint used to key per-session caches.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        match self {
            Self::Session {
                session_id,
                csrf_token,
            } => {
                hasher.update(b"session:");
                hasher.update(session_id.expose_secret().as_bytes());
                if let Some(csrf) = csrf_token {
                    hasher.update(b":");
                    hasher.update(csrf.expose_secret().as_bytes());
                }
            }
            Self::Bearer(token) => {
                hasher.update(b"bearer:");
                hasher.update(token.expose_secret().as_bytes());
            }
        }
        hex::encode(hasher.finalize())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Session { .. } => write!(f, "Credentials::Session([REDACTED])"),
            Self::Bearer(_) => write!(f, "Credentials::Bearer([REDACTED])"),
        }
    }
}

//! Credentials for the GitHub API.
//!
//! A credential widens the visibility of every listing from public data to
//! public and private data of the authenticated identity. Its absence is not an
//! error.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use secrecy::{ExposeSecret, SecretString};

/// Authentication method for GitHub API.
#[derive(Debug, Clone)]
pub enum AuthMethod {
    /// Personal access, OAuth or Actions token sent as a bearer token.
    Token(SecretString),
    /// HTTP basic credentials (username and token/password).
    Basic {
        /// Username.
        username: String,
        /// Password or token.
        password: SecretString,
    },
}

impl AuthMethod {
    /// Creates a token authentication method.
    pub fn token(token: impl Into<String>) -> Self {
        Self::Token(SecretString::new(token.into()))
    }

    /// Creates a basic authentication method.
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: SecretString::new(password.into()),
        }
    }

    /// Builds the `Authorization` header value.
    pub fn authorization_header(&self) -> String {
        match self {
            Self::Token(token) => format!("Bearer {}", token.expose_secret()),
            Self::Basic { username, password } => {
                let raw = format!("{}:{}", username, password.expose_secret());
                format!("Basic {}", STANDARD.encode(raw))
            }
        }
    }

    /// Gets the token prefix for logging.
    pub fn token_prefix(&self) -> &'static str {
        match self {
            Self::Token(t) => {
                let exposed = t.expose_secret();
                if exposed.starts_with("ghp_") {
                    "ghp_***"
                } else if exposed.starts_with("github_pat_") {
                    "github_pat_***"
                } else if exposed.starts_with("gho_") {
                    "gho_***"
                } else {
                    "***"
                }
            }
            Self::Basic { .. } => "basic",
        }
    }
}

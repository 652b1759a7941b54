//! Token claim types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Signed claim set carried by an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Email
    pub email: String,
    /// Issued at
    pub iat: u64,
    /// Expires at
    pub exp: u64,
}

impl AccessTokenClaims {
    /// Parse the subject claim as a user id
    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }
}

/// Verified claims from a Google-issued ID token.
///
/// Built from the tokeninfo endpoint response; consumed once during login
/// to establish or look up the local user identity, never persisted.
#[derive(Debug, Clone)]
pub struct GoogleTokenPayload {
    pub sub: String,
    pub email: String,
    pub name: Option<String>,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

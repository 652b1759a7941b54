//! Refresh token generation and hashing
//!
//! Plaintext refresh tokens are random 32-byte values from the OS CSPRNG,
//! base64url-encoded. Only the hex SHA-256 digest is ever persisted or
//! queried against.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use sha2::{Digest, Sha256};

use crate::error::AuthError;

const REFRESH_TOKEN_BYTES: usize = 32;

/// Generate a new opaque refresh token value.
pub fn generate_refresh_token() -> Result<String, AuthError> {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    getrandom::getrandom(&mut bytes).map_err(|e| {
        tracing::error!(error = %e, "CSPRNG failure generating refresh token");
        AuthError::TokenGenerationFailed
    })?;

    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// One-way hash of a refresh token; the persisted lookup key.
pub fn hash_refresh_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

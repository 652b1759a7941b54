//! Access token signing, verification, and bearer authentication

use axum::http::{header::AUTHORIZATION, HeaderMap, HeaderValue};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::claims::AccessTokenClaims;
use crate::config::AuthConfig;
use crate::error::AuthError;

/// Sign a short-lived access token for the given user.
pub fn generate_access_token(
    config: &AuthConfig,
    user_id: Uuid,
    email: &str,
) -> Result<String, AuthError> {
    let now = Utc::now().timestamp() as u64;
    let claims = AccessTokenClaims {
        sub: user_id.to_string(),
        email: email.to_string(),
        iat: now,
        exp: now + config.access_ttl_secs,
    };

    let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_ref());
    encode(&Header::new(Algorithm::HS256), &claims, &encoding_key).map_err(|e| {
        tracing::error!(error = %e, "Failed to sign access token");
        AuthError::TokenSigningFailed
    })
}

/// Verify an access token and return its claims.
///
/// Any failure (expired, malformed, bad signature) is `None`; callers
/// branch on the absence, they never see the underlying error.
pub fn verify_access_token(config: &AuthConfig, token: &str) -> Option<AccessTokenClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_aud = false;

    let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_ref());

    match decode::<AccessTokenClaims>(token, &decoding_key, &validation) {
        Ok(token_data) => Some(token_data.claims),
        Err(e) => {
            tracing::debug!(error = %e, "Access token validation failed");
            None
        }
    }
}

/// Extract bearer token from Authorization header.
///
/// The client always sends the header, with an empty value when logged out;
/// an empty or non-Bearer value rejects here.
pub fn extract_bearer_token(header: &HeaderValue) -> Result<String, AuthError> {
    let header_str = header
        .to_str()
        .map_err(|_| AuthError::InvalidAuthorizationFormat)?;

    match header_str.strip_prefix("Bearer ") {
        Some(token) if !token.is_empty() => Ok(token.to_string()),
        _ => Err(AuthError::InvalidAuthorizationFormat),
    }
}

/// Authenticate a request from its Authorization header.
///
/// Missing header, malformed value, and failed verification all reject
/// with the same `UNAUTHORIZED` wire code; the client treats them
/// identically (refresh and replay).
pub fn authenticate_bearer(
    config: &AuthConfig,
    headers: &HeaderMap,
) -> Result<AccessTokenClaims, AuthError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthorization)?;

    let token = extract_bearer_token(auth_header)?;
    verify_access_token(config, &token).ok_or(AuthError::InvalidToken)
}

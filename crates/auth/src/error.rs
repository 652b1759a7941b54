//! Token service errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::store::StoreError;

/// Token service error.
///
/// Expected runtime failures (expired, missing, invalid tokens) never take
/// this form; those are `None` returns at the function that detects them.
/// These variants cover request rejection and genuine faults.
#[derive(Debug)]
pub enum AuthError {
    MissingAuthorization,
    InvalidAuthorizationFormat,
    InvalidToken,
    TokenSigningFailed,
    TokenGenerationFailed,
    /// Rotating a token row that does not exist. Callers only rotate tokens
    /// they just validated, so this indicates a logic bug and propagates
    /// instead of collapsing to `None`.
    RotatedTokenMissing,
    Store(StoreError),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        AuthError::Store(err)
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AuthError::MissingAuthorization => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authorization header required",
            ),
            AuthError::InvalidAuthorizationFormat => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Invalid authorization header format",
            ),
            AuthError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Invalid or expired token",
            ),
            AuthError::TokenSigningFailed => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Failed to sign access token",
            ),
            AuthError::TokenGenerationFailed => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Failed to generate refresh token",
            ),
            AuthError::RotatedTokenMissing => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Refresh token missing during rotation",
            ),
            AuthError::Store(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Token store error",
            ),
        };

        // GraphQL-style envelope: the client refresh layer branches on
        // extensions.code == "UNAUTHORIZED"
        let body = Json(json!({
            "errors": [{
                "message": message,
                "extensions": { "code": code },
            }]
        }));

        (status, body).into_response()
    }
}

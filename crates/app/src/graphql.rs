//! The fixed GraphQL auth wire surface
//!
//! One `/graphql` route handling the auth operations the client speaks:
//! `googleLoginMutation`, `refreshTokenMutation`, `logoutMutation`,
//! `logoutAllMutation`, and the `viewer` query. Operation documents are
//! fixed wire shapes, so dispatch is by operation name, with no schema engine.
//!
//! Mutation payloads report expected failures inside `data` as
//! `{accessToken: null, errors: [{code, message}]}`; only bearer-token
//! rejection surfaces as a top-level `UNAUTHORIZED` error, the client's
//! refresh-and-replay trigger.

use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use lifelog_auth::cookie::{build_clear_cookie, build_refresh_cookie, get_cookie, REFRESH_COOKIE_NAME};
use lifelog_auth::{
    authenticate_bearer, create_refresh_token, extract_token_metadata, generate_access_token,
    revoke_all_user_tokens, revoke_refresh_token, rotate_refresh_token, validate_refresh_token,
    AuthError,
};
use lifelog_common::wire::{CODE_NO_REFRESH_TOKEN, CODE_UNAUTHENTICATED};
use lifelog_common::Error;

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct GraphqlRequest {
    pub query: String,
    #[serde(default)]
    pub variables: Option<Value>,
}

pub async fn graphql_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<GraphqlRequest>,
) -> Result<Response, AuthError> {
    let query = request.query.as_str();

    if query.contains("refreshTokenMutation") {
        refresh_token(&state, &headers).await
    } else if query.contains("googleLoginMutation") {
        google_login(&state, &headers, request.variables.as_ref()).await
    } else if query.contains("logoutAllMutation") {
        logout_all(&state, &headers).await
    } else if query.contains("logoutMutation") {
        logout(&state, &headers).await
    } else if query.contains("viewer") {
        viewer(&state, &headers)
    } else {
        tracing::debug!("Unknown GraphQL operation");
        Ok(Error::Validation("Unknown operation".to_string()).into_response())
    }
}

/// Exchange a verified Google ID token for a session: upsert the local
/// user, issue an access token, and set the refresh cookie.
async fn google_login(
    state: &AppState,
    headers: &HeaderMap,
    variables: Option<&Value>,
) -> Result<Response, AuthError> {
    let id_token = variables
        .and_then(|v| v.get("idToken"))
        .and_then(Value::as_str)
        .unwrap_or_default();

    let Some(payload) = state.google.verify(id_token).await else {
        // Verification failure is a login failure, not a server error
        return Ok(payload_errors(
            "googleLoginMutation",
            CODE_UNAUTHENTICATED,
            "Google token verification failed",
        )
        .into_response());
    };

    let user = state
        .users
        .upsert_google_user(&payload.sub, &payload.email, payload.name.as_deref())
        .await?;

    let access_token = generate_access_token(&state.auth, user.id, &user.email)?;
    let metadata = extract_token_metadata(headers);
    let refresh_token =
        create_refresh_token(state.tokens.as_ref(), &state.auth, user.id, metadata).await?;

    tracing::info!(user_id = %user.id, "User logged in via Google");

    let body = json!({
        "data": {
            "googleLoginMutation": {
                "accessToken": access_token,
                "user": {
                    "id": user.id,
                    "email": user.email,
                    "name": user.name,
                },
                "errors": null,
            }
        }
    });

    Ok(with_refresh_cookie(state, &refresh_token, Json(body)))
}

/// Validate and rotate the refresh cookie, returning a fresh access token.
async fn refresh_token(state: &AppState, headers: &HeaderMap) -> Result<Response, AuthError> {
    let Some(presented) = get_cookie(headers, REFRESH_COOKIE_NAME) else {
        // Normal for anonymous/logged-out sessions; no log
        return Ok(payload_errors(
            "refreshTokenMutation",
            CODE_NO_REFRESH_TOKEN,
            "No refresh token provided",
        )
        .into_response());
    };

    let Some(identity) = validate_refresh_token(state.tokens.as_ref(), presented).await? else {
        tracing::debug!("Refresh token invalid, expired, or already rotated");
        return Ok(with_cleared_cookie(
            state,
            payload_errors(
                "refreshTokenMutation",
                CODE_NO_REFRESH_TOKEN,
                "Invalid refresh token",
            ),
        ));
    };

    let Some(user) = state.users.find_by_id(identity.user_id).await? else {
        // Token row outlived its user; treat as an invalid session
        revoke_refresh_token(state.tokens.as_ref(), presented).await?;
        return Ok(with_cleared_cookie(
            state,
            payload_errors(
                "refreshTokenMutation",
                CODE_NO_REFRESH_TOKEN,
                "Invalid refresh token",
            ),
        ));
    };

    let metadata = extract_token_metadata(headers);
    let rotated = rotate_refresh_token(
        state.tokens.as_ref(),
        &state.auth,
        identity.token_id,
        metadata,
    )
    .await?;
    let access_token = generate_access_token(&state.auth, user.id, &user.email)?;

    let body = json!({
        "data": {
            "refreshTokenMutation": {
                "accessToken": access_token,
                "errors": null,
            }
        }
    });

    Ok(with_refresh_cookie(state, &rotated, Json(body)))
}

/// Revoke the presented refresh cookie and clear it. Idempotent.
async fn logout(state: &AppState, headers: &HeaderMap) -> Result<Response, AuthError> {
    if let Some(presented) = get_cookie(headers, REFRESH_COOKIE_NAME) {
        revoke_refresh_token(state.tokens.as_ref(), presented).await?;
    }

    let body = json!({
        "data": { "logoutMutation": { "success": true, "errors": null } }
    });

    Ok(with_cleared_cookie(state, Json(body)))
}

/// Revoke every refresh token of the authenticated user.
async fn logout_all(state: &AppState, headers: &HeaderMap) -> Result<Response, AuthError> {
    let claims = authenticate_bearer(&state.auth, headers)?;
    let user_id = claims.user_id().ok_or(AuthError::InvalidToken)?;

    revoke_all_user_tokens(state.tokens.as_ref(), user_id).await?;
    tracing::info!(user_id = %user_id, "Logged out all devices");

    let body = json!({
        "data": { "logoutAllMutation": { "success": true, "errors": null } }
    });

    Ok(with_cleared_cookie(state, Json(body)))
}

/// Identity of the bearer token's owner; the minimal authenticated query.
fn viewer(state: &AppState, headers: &HeaderMap) -> Result<Response, AuthError> {
    let claims = authenticate_bearer(&state.auth, headers)?;

    let body = json!({
        "data": {
            "viewer": {
                "id": claims.sub,
                "email": claims.email,
            }
        }
    });

    Ok(Json(body).into_response())
}

fn payload_errors(field: &str, code: &str, message: &str) -> Json<Value> {
    Json(json!({
        "data": {
            field: {
                "accessToken": null,
                "errors": [{ "code": code, "message": message }],
            }
        }
    }))
}

fn with_refresh_cookie(state: &AppState, token: &str, body: Json<Value>) -> Response {
    let max_age = state.auth.refresh_ttl_days * 86_400;
    let cookie = build_refresh_cookie(token, max_age, state.cookie_secure);
    ([(SET_COOKIE, cookie)], body).into_response()
}

fn with_cleared_cookie(state: &AppState, body: Json<Value>) -> Response {
    let cookie = build_clear_cookie(state.cookie_secure);
    ([(SET_COOKIE, cookie)], body).into_response()
}

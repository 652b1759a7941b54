//! Refresh mutation transport
//!
//! Issues the fixed refresh-token mutation against the GraphQL endpoint.
//! The reqwest client must carry a cookie store; the refresh token travels
//! only as the httpOnly cookie the server set, never in the request itself.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use lifelog_common::wire::CODE_NO_REFRESH_TOKEN;

use crate::error::ClientError;

/// The fixed refresh mutation document.
pub const REFRESH_TOKEN_MUTATION: &str =
    "mutation RefreshTokenMutation { refreshTokenMutation { accessToken errors { code message } } }";

/// Source of fresh access tokens for the cache.
///
/// Failure is `None`, signaling "treat as logged out"; implementations
/// never surface errors to the cache.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self) -> Option<String>;
}

#[derive(Deserialize)]
struct GraphqlResponse {
    data: Option<RefreshData>,
    errors: Option<Vec<GraphqlError>>,
}

#[derive(Deserialize)]
struct RefreshData {
    #[serde(rename = "refreshTokenMutation")]
    refresh_token_mutation: Option<RefreshPayload>,
}

#[derive(Deserialize)]
struct RefreshPayload {
    #[serde(rename = "accessToken")]
    access_token: Option<String>,
    errors: Option<Vec<PayloadError>>,
}

#[derive(Deserialize)]
struct PayloadError {
    code: String,
    #[allow(dead_code)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct GraphqlError {
    message: String,
}

/// Refreshes by POSTing [`REFRESH_TOKEN_MUTATION`] to the GraphQL endpoint.
#[derive(Clone)]
pub struct HttpRefresher {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpRefresher {
    /// The client must be built with `cookie_store(true)` so the refresh
    /// cookie travels with the POST; share the same client with the
    /// GraphQL transport so both see one cookie jar.
    pub fn new(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    async fn try_refresh(&self) -> Result<Option<String>, ClientError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&json!({ "query": REFRESH_TOKEN_MUTATION }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(http_status = %status, "Refresh mutation rejected");
            return Ok(None);
        }

        let body: GraphqlResponse = response.json().await?;

        if let Some(errors) = body.errors.filter(|e| !e.is_empty()) {
            tracing::warn!(message = %errors[0].message, "Refresh mutation returned errors");
            return Ok(None);
        }

        let Some(payload) = body.data.and_then(|d| d.refresh_token_mutation) else {
            tracing::warn!("Refresh mutation response missing payload");
            return Ok(None);
        };

        if let Some(errors) = payload.errors.filter(|e| !e.is_empty()) {
            // No cookie is the normal state for anonymous and logged-out
            // sessions; keep it out of the error channel.
            if errors.iter().all(|e| e.code == CODE_NO_REFRESH_TOKEN) {
                tracing::debug!("No refresh token available");
            } else {
                tracing::warn!(code = %errors[0].code, "Refresh rejected by server");
            }
            return Ok(None);
        }

        match payload.access_token {
            Some(token) => Ok(Some(token)),
            None => {
                tracing::warn!("Refresh payload carried no access token");
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl TokenRefresher for HttpRefresher {
    async fn refresh(&self) -> Option<String> {
        match self.try_refresh().await {
            Ok(token) => token,
            Err(e) => {
                tracing::error!(error = %e, "Refresh request failed");
                None
            }
        }
    }
}

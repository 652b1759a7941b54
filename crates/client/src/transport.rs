//! GraphQL transport with refresh-and-replay
//!
//! Every outgoing operation carries an Authorization header (empty value
//! when logged out, never omitted). A response carrying an error with
//! `extensions.code == "UNAUTHORIZED"` routes through the refresh
//! coordinator exactly once and replays the original operation with the
//! new bearer token.

use std::sync::Arc;

use reqwest::header::{HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

use lifelog_common::wire::CODE_UNAUTHORIZED;

use crate::cache::TokenCache;
use crate::error::ClientError;
use crate::replay::RefreshCoordinator;

/// Invoked when a refresh-and-replay round fails; the UI redirects to the
/// login route here.
pub type AuthFailureHandler = Arc<dyn Fn() + Send + Sync>;

#[derive(Clone)]
pub struct GraphqlClient {
    http: reqwest::Client,
    endpoint: String,
    cache: TokenCache,
    coordinator: RefreshCoordinator,
    on_auth_failure: Option<AuthFailureHandler>,
}

impl GraphqlClient {
    /// The reqwest client should be the same cookie-carrying client used by
    /// the refresher.
    pub fn new(
        http: reqwest::Client,
        endpoint: impl Into<String>,
        cache: TokenCache,
        coordinator: RefreshCoordinator,
    ) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            cache,
            coordinator,
            on_auth_failure: None,
        }
    }

    pub fn with_auth_failure_handler(mut self, handler: AuthFailureHandler) -> Self {
        self.on_auth_failure = Some(handler);
        self
    }

    /// Execute an operation, refreshing and replaying once on UNAUTHORIZED.
    pub async fn execute(
        &self,
        query: &str,
        variables: Option<Value>,
    ) -> Result<Value, ClientError> {
        let token = self.cache.get_valid_access_token().await.unwrap_or_default();

        let response = self.send(query, variables.clone(), &token).await?;
        if !has_unauthorized_error(&response) {
            return Ok(response);
        }

        match self.coordinator.refresh_after_unauthorized().await {
            Ok(new_token) => self.send(query, variables, &new_token).await,
            Err(e) => {
                if let Some(handler) = &self.on_auth_failure {
                    handler();
                }
                Err(e)
            }
        }
    }

    async fn send(
        &self,
        query: &str,
        variables: Option<Value>,
        token: &str,
    ) -> Result<Value, ClientError> {
        let mut body = json!({ "query": query });
        if let Some(variables) = variables {
            body["variables"] = variables;
        }

        // Header always present; empty value when there is no token
        let bearer = if token.is_empty() {
            String::new()
        } else {
            format!("Bearer {token}")
        };

        let response = self
            .http
            .post(&self.endpoint)
            .header(
                AUTHORIZATION,
                HeaderValue::from_str(&bearer).unwrap_or_else(|_| HeaderValue::from_static("")),
            )
            .json(&body)
            .send()
            .await?;

        Ok(response.json().await?)
    }
}

/// Whether a GraphQL response signals an expired/invalid access token.
pub(crate) fn has_unauthorized_error(response: &Value) -> bool {
    response
        .get("errors")
        .and_then(Value::as_array)
        .map(|errors| {
            errors.iter().any(|error| {
                error
                    .pointer("/extensions/code")
                    .and_then(Value::as_str)
                    .map(|code| code == CODE_UNAUTHORIZED)
                    .unwrap_or(false)
            })
        })
        .unwrap_or(false)
}

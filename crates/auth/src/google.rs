//! Google ID token verification
//!
//! Verifies Google-issued ID tokens against the tokeninfo endpoint.
//! Docs: https://developers.google.com/identity/sign-in/web/backend-auth

use chrono::Utc;
use reqwest::Client;

use crate::claims::GoogleTokenPayload;

const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

/// Verifies Google ID tokens for a configured OAuth client id.
#[derive(Clone)]
pub struct GoogleVerifier {
    http: Client,
    client_id: String,
    tokeninfo_url: String,
}

impl GoogleVerifier {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self::with_endpoint(client_id, TOKENINFO_URL)
    }

    /// Construct with a non-default tokeninfo endpoint (test stubs).
    pub fn with_endpoint(client_id: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            client_id: client_id.into(),
            tokeninfo_url: endpoint.into(),
        }
    }

    /// Verify an ID token and return its claims.
    ///
    /// Every failure path (network error, non-2xx status, malformed body,
    /// audience mismatch, unknown issuer, expired token) is `None`. The
    /// caller treats `None` as a login failure; nothing propagates.
    pub async fn verify(&self, id_token: &str) -> Option<GoogleTokenPayload> {
        let response = match self
            .http
            .get(&self.tokeninfo_url)
            .query(&[("id_token", id_token)])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "Google tokeninfo request failed");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            // 400 is Google's answer for invalid/expired tokens
            tracing::debug!(http_status = %status, "Google tokeninfo rejected token");
            return None;
        }

        let body: serde_json::Value = match response.json().await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to parse Google tokeninfo response");
                return None;
            }
        };

        self.payload_from_tokeninfo(&body)
    }

    /// Build and check the typed payload from a tokeninfo response body.
    ///
    /// tokeninfo serializes numeric claims as strings.
    fn payload_from_tokeninfo(&self, body: &serde_json::Value) -> Option<GoogleTokenPayload> {
        let str_field = |name: &str| body.get(name)?.as_str().map(str::to_string);

        let aud = str_field("aud")?;
        if aud != self.client_id {
            tracing::warn!("Google ID token audience mismatch");
            return None;
        }

        let iss = str_field("iss")?;
        if !GOOGLE_ISSUERS.contains(&iss.as_str()) {
            tracing::warn!(issuer = %iss, "Google ID token from unknown issuer");
            return None;
        }

        let iat: i64 = str_field("iat")?.parse().ok()?;
        let exp: i64 = str_field("exp")?.parse().ok()?;
        if exp <= Utc::now().timestamp() {
            tracing::debug!("Google ID token expired");
            return None;
        }

        Some(GoogleTokenPayload {
            sub: str_field("sub")?,
            email: str_field("email")?,
            name: str_field("name"),
            iss,
            aud,
            iat,
            exp,
        })
    }
}

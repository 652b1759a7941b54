//! Shared helpers for integration tests: in-memory app wiring, a Google
//! tokeninfo stub, and login plumbing.

// Not every test target uses every helper
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::{extract::Query, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde_json::{json, Value};

use lifelog_app::{AppState, MemoryUserStore};
use lifelog_auth::{AuthConfig, GoogleVerifier, MemoryRefreshTokenStore};

pub const CLIENT_ID: &str = "lifelog-tests.apps.googleusercontent.com";
pub const GOOD_ID_TOKEN: &str = "stub-google-id-token";

/// Serve a router on an ephemeral local port, returning its base URL.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });

    format!("http://{addr}")
}

/// Stub of Google's tokeninfo endpoint: accepts exactly `GOOD_ID_TOKEN`.
pub async fn start_google_stub() -> String {
    async fn tokeninfo(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
        if params.get("id_token").map(String::as_str) == Some(GOOD_ID_TOKEN) {
            let now = unix_now();
            Json(json!({
                "sub": "109876543210987654321",
                "email": "user@example.com",
                "name": "Test User",
                "iss": "https://accounts.google.com",
                "aud": CLIENT_ID,
                "iat": (now - 60).to_string(),
                "exp": (now + 3600).to_string(),
            }))
            .into_response()
        } else {
            (StatusCode::BAD_REQUEST, Json(json!({"error": "invalid_token"})))
                .into_response()
        }
    }

    let base = serve(Router::new().route("/tokeninfo", get(tokeninfo))).await;
    format!("{base}/tokeninfo")
}

fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock")
        .as_secs() as i64
}

/// App state over in-memory stores, pointed at the tokeninfo stub.
pub fn test_state(google_endpoint: &str) -> AppState {
    AppState {
        auth: AuthConfig::new("integration-test-secret"),
        cookie_secure: false,
        tokens: Arc::new(MemoryRefreshTokenStore::new()),
        users: Arc::new(MemoryUserStore::new()),
        google: GoogleVerifier::with_endpoint(CLIENT_ID, google_endpoint),
    }
}

/// Start the full app and return its GraphQL endpoint URL.
pub async fn start_app() -> String {
    let google_endpoint = start_google_stub().await;
    let state = test_state(&google_endpoint);
    let base = serve(lifelog_app::router(state)).await;
    format!("{base}/graphql")
}

pub const LOGIN_MUTATION: &str = "mutation GoogleLoginMutation($idToken: String!) { googleLoginMutation(idToken: $idToken) { accessToken user { id email name } errors { code message } } }";

pub const VIEWER_QUERY: &str = "query Viewer { viewer { id email } }";

pub const LOGOUT_MUTATION: &str =
    "mutation LogoutMutation { logoutMutation { success errors { code message } } }";

pub const LOGOUT_ALL_MUTATION: &str =
    "mutation LogoutAllMutation { logoutAllMutation { success errors { code message } } }";

/// Log in through the wire; the client's cookie jar picks up the refresh
/// cookie. Returns the access token.
pub async fn login(http: &reqwest::Client, endpoint: &str) -> String {
    let response: Value = http
        .post(endpoint)
        .json(&json!({
            "query": LOGIN_MUTATION,
            "variables": { "idToken": GOOD_ID_TOKEN },
        }))
        .send()
        .await
        .expect("login request")
        .json()
        .await
        .expect("login body");

    response
        .pointer("/data/googleLoginMutation/accessToken")
        .and_then(Value::as_str)
        .expect("login should return an access token")
        .to_string()
}

/// A reqwest client with a cookie store, as the refresh flow requires.
pub fn cookie_client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("build client")
}

//! End-to-end auth lifecycle against a live server with in-memory stores:
//! Google login, authenticated queries, refresh rotation, and logout.

mod support;

use serde_json::{json, Value};

use support::{
    cookie_client, login, start_app, GOOD_ID_TOKEN, LOGIN_MUTATION, LOGOUT_ALL_MUTATION,
    LOGOUT_MUTATION, VIEWER_QUERY,
};

async fn post_graphql(
    http: &reqwest::Client,
    endpoint: &str,
    query: &str,
    variables: Option<Value>,
    bearer: Option<&str>,
) -> Value {
    let mut body = json!({ "query": query });
    if let Some(variables) = variables {
        body["variables"] = variables;
    }

    let mut request = http.post(endpoint).json(&body);
    if let Some(token) = bearer {
        request = request.header("authorization", format!("Bearer {token}"));
    }

    request
        .send()
        .await
        .expect("graphql request")
        .json()
        .await
        .expect("graphql body")
}

#[tokio::test]
async fn test_google_login_returns_session() {
    let endpoint = start_app().await;
    let http = cookie_client();

    let response = post_graphql(
        &http,
        &endpoint,
        LOGIN_MUTATION,
        Some(json!({ "idToken": GOOD_ID_TOKEN })),
        None,
    )
    .await;

    let payload = &response["data"]["googleLoginMutation"];
    assert!(payload["accessToken"].is_string());
    assert_eq!(payload["user"]["email"], "user@example.com");
    assert_eq!(payload["user"]["name"], "Test User");
    assert!(payload["errors"].is_null());
}

#[tokio::test]
async fn test_login_rejects_invalid_id_token() {
    let endpoint = start_app().await;
    let http = cookie_client();

    let response = post_graphql(
        &http,
        &endpoint,
        LOGIN_MUTATION,
        Some(json!({ "idToken": "forged-token" })),
        None,
    )
    .await;

    let payload = &response["data"]["googleLoginMutation"];
    assert!(payload["accessToken"].is_null());
    assert_eq!(payload["errors"][0]["code"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn test_viewer_requires_valid_bearer() {
    let endpoint = start_app().await;
    let http = cookie_client();
    let access_token = login(&http, &endpoint).await;

    // With the bearer token the viewer resolves
    let response = post_graphql(&http, &endpoint, VIEWER_QUERY, None, Some(&access_token)).await;
    assert_eq!(response["data"]["viewer"]["email"], "user@example.com");

    // Without it, the top-level UNAUTHORIZED error the client replays on
    let response = post_graphql(&http, &endpoint, VIEWER_QUERY, None, None).await;
    assert_eq!(response["errors"][0]["extensions"]["code"], "UNAUTHORIZED");

    let response = post_graphql(&http, &endpoint, VIEWER_QUERY, None, Some("garbage")).await;
    assert_eq!(response["errors"][0]["extensions"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_refresh_rotates_and_issues_new_access_token() {
    let endpoint = start_app().await;
    let http = cookie_client();
    let first_token = login(&http, &endpoint).await;

    // Cookie jar carries the refresh cookie set at login
    let refresh_mutation = lifelog_client::REFRESH_TOKEN_MUTATION;
    let response = post_graphql(&http, &endpoint, refresh_mutation, None, None).await;

    let payload = &response["data"]["refreshTokenMutation"];
    let second_token = payload["accessToken"].as_str().expect("rotated token");
    assert!(payload["errors"].is_null());

    // The new token works against the viewer query
    let response = post_graphql(&http, &endpoint, VIEWER_QUERY, None, Some(second_token)).await;
    assert_eq!(response["data"]["viewer"]["email"], "user@example.com");

    // Both tokens are independently valid JWTs; rotation replaces the
    // refresh cookie, not the outstanding access token
    let response = post_graphql(&http, &endpoint, VIEWER_QUERY, None, Some(&first_token)).await;
    assert_eq!(response["data"]["viewer"]["email"], "user@example.com");
}

#[tokio::test]
async fn test_rotated_refresh_token_is_single_use() {
    let endpoint = start_app().await;

    // No cookie jar here: capture and replay cookies by hand
    let http = reqwest::Client::new();
    let login_response = http
        .post(&endpoint)
        .json(&json!({
            "query": LOGIN_MUTATION,
            "variables": { "idToken": GOOD_ID_TOKEN },
        }))
        .send()
        .await
        .expect("login request");

    let original_cookie = login_response
        .headers()
        .get("set-cookie")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .expect("login sets the refresh cookie")
        .to_string();

    let refresh_mutation = lifelog_client::REFRESH_TOKEN_MUTATION;

    // First presentation rotates
    let response: Value = http
        .post(&endpoint)
        .header("cookie", &original_cookie)
        .json(&json!({ "query": refresh_mutation }))
        .send()
        .await
        .expect("refresh request")
        .json()
        .await
        .expect("refresh body");
    assert!(response["data"]["refreshTokenMutation"]["accessToken"].is_string());

    // Replaying the pre-rotation cookie fails
    let response: Value = http
        .post(&endpoint)
        .header("cookie", &original_cookie)
        .json(&json!({ "query": refresh_mutation }))
        .send()
        .await
        .expect("replay request")
        .json()
        .await
        .expect("replay body");

    let payload = &response["data"]["refreshTokenMutation"];
    assert!(payload["accessToken"].is_null());
    assert_eq!(payload["errors"][0]["code"], "NO_REFRESH_TOKEN");
}

#[tokio::test]
async fn test_refresh_without_cookie_is_a_quiet_failure() {
    let endpoint = start_app().await;
    let http = cookie_client();

    // Anonymous session: the expected NO_REFRESH_TOKEN payload error, not
    // a top-level error or non-2xx status
    let response = post_graphql(&http, &endpoint, lifelog_client::REFRESH_TOKEN_MUTATION, None, None)
        .await;

    let payload = &response["data"]["refreshTokenMutation"];
    assert!(payload["accessToken"].is_null());
    assert_eq!(payload["errors"][0]["code"], "NO_REFRESH_TOKEN");
    assert!(response.get("errors").is_none());
}

#[tokio::test]
async fn test_logout_revokes_the_refresh_cookie() {
    let endpoint = start_app().await;
    let http = cookie_client();
    login(&http, &endpoint).await;

    let response = post_graphql(&http, &endpoint, LOGOUT_MUTATION, None, None).await;
    assert_eq!(response["data"]["logoutMutation"]["success"], true);

    // The server cleared the cookie and revoked the row; refresh now fails
    let response = post_graphql(&http, &endpoint, lifelog_client::REFRESH_TOKEN_MUTATION, None, None)
        .await;
    let payload = &response["data"]["refreshTokenMutation"];
    assert!(payload["accessToken"].is_null());
    assert_eq!(payload["errors"][0]["code"], "NO_REFRESH_TOKEN");
}

#[tokio::test]
async fn test_logout_is_idempotent() {
    let endpoint = start_app().await;
    let http = cookie_client();

    // Logging out with no session at all still succeeds
    let response = post_graphql(&http, &endpoint, LOGOUT_MUTATION, None, None).await;
    assert_eq!(response["data"]["logoutMutation"]["success"], true);
}

#[tokio::test]
async fn test_logout_all_requires_authentication() {
    let endpoint = start_app().await;
    let http = cookie_client();
    let access_token = login(&http, &endpoint).await;

    // Unauthenticated attempt is rejected at the bearer check
    let response = post_graphql(&http, &endpoint, LOGOUT_ALL_MUTATION, None, None).await;
    assert_eq!(response["errors"][0]["extensions"]["code"], "UNAUTHORIZED");

    let response =
        post_graphql(&http, &endpoint, LOGOUT_ALL_MUTATION, None, Some(&access_token)).await;
    assert_eq!(response["data"]["logoutAllMutation"]["success"], true);

    // Every session's refresh token is gone
    let response = post_graphql(&http, &endpoint, lifelog_client::REFRESH_TOKEN_MUTATION, None, None)
        .await;
    let payload = &response["data"]["refreshTokenMutation"];
    assert!(payload["accessToken"].is_null());
}

#[tokio::test]
async fn test_unknown_operation_is_a_validation_error() {
    let endpoint = start_app().await;
    let http = cookie_client();

    let response = post_graphql(&http, &endpoint, "query Bogus { bogus }", None, None).await;

    // Not UNAUTHORIZED: the client must not treat this as a replay trigger
    assert_eq!(
        response["errors"][0]["extensions"]["code"],
        "VALIDATION_ERROR"
    );
}

#[tokio::test]
async fn test_repeat_login_reuses_the_user() {
    let endpoint = start_app().await;

    let first = cookie_client();
    let second = cookie_client();

    let first_response = post_graphql(
        &first,
        &endpoint,
        LOGIN_MUTATION,
        Some(json!({ "idToken": GOOD_ID_TOKEN })),
        None,
    )
    .await;
    let second_response = post_graphql(
        &second,
        &endpoint,
        LOGIN_MUTATION,
        Some(json!({ "idToken": GOOD_ID_TOKEN })),
        None,
    )
    .await;

    // Same Google subject resolves to the same local user id
    assert_eq!(
        first_response["data"]["googleLoginMutation"]["user"]["id"],
        second_response["data"]["googleLoginMutation"]["user"]["id"],
    );
}

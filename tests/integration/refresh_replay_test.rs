//! Client-side refresh behavior against a live server: single-flight
//! refresh through the cookie jar, and refresh-and-replay after an
//! UNAUTHORIZED response.

mod support;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;

use lifelog_client::{
    ClientError, GraphqlClient, HttpRefresher, RefreshCoordinator, TokenCache, TokenRefresher,
};
use support::{cookie_client, login, start_app, VIEWER_QUERY};

/// Wraps the real HTTP refresher and counts how often it fires.
struct CountingRefresher {
    inner: HttpRefresher,
    calls: AtomicUsize,
}

impl CountingRefresher {
    fn new(inner: HttpRefresher) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenRefresher for CountingRefresher {
    async fn refresh(&self) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.refresh().await
    }
}

fn wire_client(
    http: reqwest::Client,
    endpoint: &str,
) -> (GraphqlClient, TokenCache, Arc<CountingRefresher>) {
    let refresher = Arc::new(CountingRefresher::new(HttpRefresher::new(
        http.clone(),
        endpoint,
    )));
    let cache = TokenCache::new(refresher.clone());
    let coordinator = RefreshCoordinator::new(cache.clone());
    let client = GraphqlClient::new(http, endpoint, cache.clone(), coordinator);
    (client, cache, refresher)
}

#[tokio::test]
async fn test_empty_cache_refreshes_once_through_the_cookie() {
    let endpoint = start_app().await;
    let http = cookie_client();
    login(&http, &endpoint).await;

    // Fresh cache, no access token set: the first operation must refresh
    // through the cookie before sending
    let (client, cache, refresher) = wire_client(http, &endpoint);

    let response = client.execute(VIEWER_QUERY, None).await.expect("viewer");
    assert_eq!(response["data"]["viewer"]["email"], "user@example.com");
    assert_eq!(refresher.calls(), 1);

    // The refreshed token is cached; a second operation reuses it
    let response = client.execute(VIEWER_QUERY, None).await.expect("viewer");
    assert_eq!(response["data"]["viewer"]["email"], "user@example.com");
    assert_eq!(refresher.calls(), 1);
    assert!(cache.get_access_token().is_some());
}

#[tokio::test]
async fn test_concurrent_cache_misses_share_one_refresh() {
    let endpoint = start_app().await;
    let http = cookie_client();
    login(&http, &endpoint).await;

    let (_, cache, refresher) = wire_client(http, &endpoint);

    let tokens = join_all((0..8).map(|_| {
        let cache = cache.clone();
        async move { cache.get_valid_access_token().await }
    }))
    .await;

    assert!(tokens.iter().all(Option::is_some));
    assert_eq!(refresher.calls(), 1, "callers must share one in-flight refresh");
}

#[tokio::test]
async fn test_unauthorized_response_triggers_refresh_and_replay() {
    let endpoint = start_app().await;
    let http = cookie_client();
    login(&http, &endpoint).await;

    let (client, cache, refresher) = wire_client(http, &endpoint);

    // Cache holds a token the server rejects; the first send comes back
    // UNAUTHORIZED and the client must refresh and replay
    cache.set_access_token("stale-access-token", 900);

    let response = client.execute(VIEWER_QUERY, None).await.expect("viewer");
    assert_eq!(response["data"]["viewer"]["email"], "user@example.com");
    assert_eq!(refresher.calls(), 1);
}

#[tokio::test]
async fn test_concurrent_unauthorized_responses_share_one_refresh() {
    let endpoint = start_app().await;
    let http = cookie_client();
    login(&http, &endpoint).await;

    let (client, cache, refresher) = wire_client(http, &endpoint);
    cache.set_access_token("stale-access-token", 900);

    let responses = join_all((0..3).map(|_| {
        let client = client.clone();
        async move { client.execute(VIEWER_QUERY, None).await }
    }))
    .await;

    for response in responses {
        let response = response.expect("replayed viewer");
        assert_eq!(response["data"]["viewer"]["email"], "user@example.com");
    }
    assert_eq!(refresher.calls(), 1, "one refresh serves every waiting operation");
}

#[tokio::test]
async fn test_failed_refresh_surfaces_auth_required() {
    let endpoint = start_app().await;

    // No login, so no refresh cookie: the refresh mutation will fail
    let http = cookie_client();
    let (client, cache, refresher) = wire_client(http, &endpoint);
    cache.set_access_token("stale-access-token", 900);

    let failed = Arc::new(AtomicBool::new(false));
    let flag = failed.clone();
    let client = client.with_auth_failure_handler(Arc::new(move || {
        flag.store(true, Ordering::SeqCst);
    }));

    let result = client.execute(VIEWER_QUERY, None).await;
    assert!(matches!(result, Err(ClientError::AuthRequired)));
    assert!(failed.load(Ordering::SeqCst), "auth failure handler must fire");
    assert_eq!(refresher.calls(), 1);

    // The stale token is gone; the session reads as logged out
    assert!(cache.get_access_token().is_none());
}

#[tokio::test]
async fn test_rotation_keeps_the_client_session_alive() {
    let endpoint = start_app().await;
    let http = cookie_client();
    login(&http, &endpoint).await;

    let (client, cache, refresher) = wire_client(http, &endpoint);

    // Three refresh rounds, each rotating the cookie server-side; the
    // client session survives every rotation
    for round in 1..=3 {
        cache.invalidate();
        let response = client.execute(VIEWER_QUERY, None).await.expect("viewer");
        assert_eq!(response["data"]["viewer"]["email"], "user@example.com");
        assert_eq!(refresher.calls(), round);
    }
}

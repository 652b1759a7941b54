//! In-memory access token cache with single-flight refresh
//!
//! One process-wide cache instance (shared by cloning; the handle is an
//! `Arc` internally) holds the current access token and its expiry. All
//! consumers that need a guaranteed-fresh token go through
//! [`TokenCache::get_valid_access_token`]; concurrent callers that find the
//! token stale share one in-flight refresh future and observe the identical
//! resolved value.

use std::sync::{Arc, Mutex};

use futures::future::{BoxFuture, FutureExt, Shared};

use crate::clock::{Clock, SystemClock};
use crate::refresher::TokenRefresher;

/// Safety margin subtracted from a token's nominal lifetime so a token is
/// never used when it could expire mid-request.
pub const BUFFER_SECONDS: i64 = 30;

/// Access token lifetime assumed when the server does not say otherwise.
pub const DEFAULT_LIFETIME_SECONDS: i64 = 900;

type InFlight = Shared<BoxFuture<'static, Option<String>>>;

#[derive(Default)]
struct CacheState {
    access_token: Option<String>,
    expires_at_millis: Option<i64>,
    in_flight: Option<InFlight>,
}

struct Inner {
    refresher: Arc<dyn TokenRefresher>,
    clock: Arc<dyn Clock>,
    state: Mutex<CacheState>,
}

/// Shared handle to the client token cache.
#[derive(Clone)]
pub struct TokenCache {
    inner: Arc<Inner>,
}

impl TokenCache {
    pub fn new(refresher: Arc<dyn TokenRefresher>) -> Self {
        Self::with_clock(refresher, Arc::new(SystemClock))
    }

    pub fn with_clock(refresher: Arc<dyn TokenRefresher>, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(Inner {
                refresher,
                clock,
                state: Mutex::new(CacheState::default()),
            }),
        }
    }

    /// Store a token, treating it as expired `BUFFER_SECONDS` before its
    /// nominal lifetime ends.
    ///
    /// A lifetime at or below the buffer stores the token already expired.
    /// That is deliberate policy, not clamped away: a token that short is
    /// unusable rather than a mid-flight expiry risk.
    pub fn set_access_token(&self, token: &str, lifetime_secs: i64) {
        let now = self.inner.clock.now_millis();
        // Strictly in the past when the buffer consumes the whole lifetime,
        // so even an immediate read misses
        let expires_at = if lifetime_secs <= BUFFER_SECONDS {
            now - 1
        } else {
            now + (lifetime_secs - BUFFER_SECONDS) * 1000
        };

        let mut state = self.inner.state.lock().unwrap();
        state.access_token = Some(token.to_string());
        state.expires_at_millis = Some(expires_at);
    }

    /// Synchronous read of the current token.
    ///
    /// Expired or absent state is cleared and reads as `None`; this never
    /// triggers a refresh; callers needing guaranteed freshness use
    /// [`Self::get_valid_access_token`].
    pub fn get_access_token(&self) -> Option<String> {
        let mut state = self.inner.state.lock().unwrap();
        self.current_unexpired(&mut state)
    }

    /// Return a currently valid token, refreshing if needed.
    ///
    /// If a refresh is already in flight, callers join it rather than
    /// starting another; N concurrent callers issue exactly one network
    /// call and all resolve to the identical value. The in-flight marker is
    /// cleared when the refresh settles, success or failure, so the next
    /// caller after a failure retries fresh.
    pub async fn get_valid_access_token(&self) -> Option<String> {
        let refresh = {
            let mut state = self.inner.state.lock().unwrap();

            if let Some(token) = self.current_unexpired(&mut state) {
                return Some(token);
            }

            match &state.in_flight {
                Some(pending) => pending.clone(),
                None => {
                    let cache = self.clone();
                    let pending: InFlight = async move { cache.refresh().await }.boxed().shared();
                    state.in_flight = Some(pending.clone());
                    pending
                }
            }
        };

        refresh.await
    }

    /// Drop the cached token and expiry so the next
    /// [`Self::get_valid_access_token`] goes to the network.
    ///
    /// Leaves any in-flight refresh alone; a caller invalidating because
    /// the server rejected the token still joins a refresh that is already
    /// under way.
    pub fn invalidate(&self) {
        let mut state = self.inner.state.lock().unwrap();
        state.access_token = None;
        state.expires_at_millis = None;
    }

    /// Drop token, expiry, and any pending refresh marker.
    pub fn clear(&self) {
        let mut state = self.inner.state.lock().unwrap();
        state.access_token = None;
        state.expires_at_millis = None;
        state.in_flight = None;
    }

    fn current_unexpired(&self, state: &mut CacheState) -> Option<String> {
        match (&state.access_token, state.expires_at_millis) {
            (Some(token), Some(expires_at)) if self.inner.clock.now_millis() <= expires_at => {
                Some(token.clone())
            }
            _ => {
                state.access_token = None;
                state.expires_at_millis = None;
                None
            }
        }
    }

    /// The single-flight body: one network refresh, state updated on
    /// settle, marker cleared either way.
    async fn refresh(&self) -> Option<String> {
        let result = self.inner.refresher.refresh().await;

        let mut state = self.inner.state.lock().unwrap();
        match &result {
            Some(token) => {
                let expires_at = self.inner.clock.now_millis()
                    + (DEFAULT_LIFETIME_SECONDS - BUFFER_SECONDS) * 1000;
                state.access_token = Some(token.clone());
                state.expires_at_millis = Some(expires_at);
            }
            None => {
                state.access_token = None;
                state.expires_at_millis = None;
            }
        }
        state.in_flight = None;

        result
    }
}

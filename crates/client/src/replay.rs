//! Single-refresh coordination for unauthorized replays
//!
//! When the API answers `UNAUTHORIZED`, every operation that failed at the
//! same moment funnels through here: the first caller leads one refresh,
//! the rest queue, and nobody is released until the refresh settles. On
//! success all waiters get the new token to replay with; on failure all
//! waiters get the rejection.

use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;

use crate::cache::TokenCache;
use crate::error::ClientError;

type RefreshOutcome = Result<String, ()>;

enum CoordState {
    Idle,
    Refreshing(Vec<oneshot::Sender<RefreshOutcome>>),
}

struct Inner {
    cache: TokenCache,
    state: Mutex<CoordState>,
}

/// Shared handle to the refresh coordinator.
#[derive(Clone)]
pub struct RefreshCoordinator {
    inner: Arc<Inner>,
}

enum Role {
    Leader,
    Waiter(oneshot::Receiver<RefreshOutcome>),
}

impl RefreshCoordinator {
    pub fn new(cache: TokenCache) -> Self {
        Self {
            inner: Arc::new(Inner {
                cache,
                state: Mutex::new(CoordState::Idle),
            }),
        }
    }

    /// Obtain a fresh token after an `UNAUTHORIZED` response.
    ///
    /// At most one refresh network call is in flight system-wide; callers
    /// arriving while one is outstanding enqueue instead of starting a
    /// second. The queue drains strictly after the refresh settles; every
    /// waiter is resolved or rejected, none is left pending.
    pub async fn refresh_after_unauthorized(&self) -> Result<String, ClientError> {
        let role = {
            let mut state = self.inner.state.lock().unwrap();
            match &mut *state {
                CoordState::Refreshing(waiters) => {
                    let (tx, rx) = oneshot::channel();
                    waiters.push(tx);
                    Role::Waiter(rx)
                }
                CoordState::Idle => {
                    *state = CoordState::Refreshing(Vec::new());
                    Role::Leader
                }
            }
        };

        match role {
            Role::Waiter(rx) => match rx.await {
                Ok(Ok(token)) => Ok(token),
                _ => Err(ClientError::AuthRequired),
            },
            Role::Leader => {
                // The server rejected the current token regardless of local
                // expiry; drop it so the cache actually refreshes. A refresh
                // already in flight is joined, not duplicated.
                self.inner.cache.invalidate();
                let result = self.inner.cache.get_valid_access_token().await;

                let outcome: RefreshOutcome = result.ok_or(());

                let waiters = {
                    let mut state = self.inner.state.lock().unwrap();
                    match std::mem::replace(&mut *state, CoordState::Idle) {
                        CoordState::Refreshing(waiters) => waiters,
                        CoordState::Idle => Vec::new(),
                    }
                };
                for waiter in waiters {
                    let _ = waiter.send(outcome.clone());
                }

                outcome.map_err(|_| ClientError::AuthRequired)
            }
        }
    }
}

//! Auth session state
//!
//! UI-facing container over the token cache. Persists only the
//! non-sensitive user profile across restarts; access and refresh tokens
//! never pass through the profile store.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::cache::{TokenCache, DEFAULT_LIFETIME_SECONDS};

/// Non-sensitive profile data kept for UX continuity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
}

/// Persistence seam for the user profile (and nothing else).
pub trait ProfileStore: Send + Sync {
    fn load(&self) -> Option<UserProfile>;
    fn save(&self, profile: &UserProfile);
    fn clear(&self);
}

/// Profile store backed by process memory; stands in where no durable
/// storage is wired.
#[derive(Default)]
pub struct MemoryProfileStore {
    profile: Mutex<Option<UserProfile>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProfileStore for MemoryProfileStore {
    fn load(&self) -> Option<UserProfile> {
        self.profile.lock().unwrap().clone()
    }

    fn save(&self, profile: &UserProfile) {
        *self.profile.lock().unwrap() = Some(profile.clone());
    }

    fn clear(&self) {
        *self.profile.lock().unwrap() = None;
    }
}

struct Inner {
    cache: TokenCache,
    profiles: Arc<dyn ProfileStore>,
    current: Mutex<Option<UserProfile>>,
}

/// Shared handle to the auth session.
#[derive(Clone)]
pub struct AuthSession {
    inner: Arc<Inner>,
}

impl AuthSession {
    pub fn new(cache: TokenCache, profiles: Arc<dyn ProfileStore>) -> Self {
        Self {
            inner: Arc::new(Inner {
                cache,
                profiles,
                current: Mutex::new(None),
            }),
        }
    }

    /// Record a successful login: cache the access token, persist the
    /// profile.
    pub fn set_auth_data(&self, access_token: &str, profile: UserProfile) {
        self.inner
            .cache
            .set_access_token(access_token, DEFAULT_LIFETIME_SECONDS);
        self.inner.profiles.save(&profile);
        *self.inner.current.lock().unwrap() = Some(profile);
    }

    /// Drop all auth state: token cache, persisted profile, current user.
    pub fn clear_auth_data(&self) {
        self.inner.cache.clear();
        self.inner.profiles.clear();
        *self.inner.current.lock().unwrap() = None;
    }

    pub fn get_access_token(&self) -> Option<String> {
        self.inner.cache.get_access_token()
    }

    pub async fn get_valid_access_token(&self) -> Option<String> {
        self.inner.cache.get_valid_access_token().await
    }

    pub fn current_profile(&self) -> Option<UserProfile> {
        self.inner.current.lock().unwrap().clone()
    }

    /// Re-establish a session on startup via silent refresh.
    ///
    /// Loads the persisted profile and attempts one refresh against the
    /// httpOnly cookie. Failure is silent; the session simply stays
    /// unauthenticated, with stale profile data cleared.
    pub async fn restore(&self) -> bool {
        let profile = self.inner.profiles.load();

        match self.inner.cache.get_valid_access_token().await {
            Some(_) => {
                *self.inner.current.lock().unwrap() = profile;
                true
            }
            None => {
                self.clear_auth_data();
                false
            }
        }
    }
}

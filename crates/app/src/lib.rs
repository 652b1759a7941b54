//! Lifelog auth service composition root
//!
//! Wires config, stores, and the token service into the application
//! router. Production wiring is Postgres-backed; tests substitute the
//! in-memory stores through [`router`].

mod graphql;
mod users;

use std::sync::Arc;

use axum::{routing::get, routing::post, Router};
use sqlx::PgPool;

use lifelog_auth::{AuthConfig, GoogleVerifier, PgRefreshTokenStore, RefreshTokenStore};
use lifelog_common::Config;

pub use users::{MemoryUserStore, PgUserStore, UserRecord, UserStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthConfig,
    pub cookie_secure: bool,
    pub tokens: Arc<dyn RefreshTokenStore>,
    pub users: Arc<dyn UserStore>,
    pub google: GoogleVerifier,
}

/// Create the application router with production (Postgres) wiring
pub async fn create_app(config: Config, pool: PgPool) -> Result<Router, anyhow::Error> {
    let auth = AuthConfig {
        jwt_secret: config.jwt_secret.clone(),
        access_ttl_secs: config.access_token_ttl_secs,
        refresh_ttl_days: config.refresh_token_ttl_days,
    };

    let state = AppState {
        auth,
        cookie_secure: config.cookie_secure,
        tokens: Arc::new(PgRefreshTokenStore::new(pool.clone())),
        users: Arc::new(PgUserStore::new(pool)),
        google: GoogleVerifier::new(config.google_client_id),
    };

    Ok(router(state))
}

/// Build the router for any state wiring (tests pass in-memory stores)
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/graphql", post(graphql::graphql_handler))
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

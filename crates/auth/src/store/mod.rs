//! Refresh token persistence seam
//!
//! The token service never constructs its store; callers inject anything
//! implementing [`RefreshTokenStore`]. Production wiring uses
//! [`PgRefreshTokenStore`]; tests use [`MemoryRefreshTokenStore`].

mod memory;
mod postgres;

pub use memory::MemoryRefreshTokenStore;
pub use postgres::PgRefreshTokenStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Persisted refresh token row.
///
/// `token_hash` is the hex SHA-256 of the plaintext; the plaintext itself
/// is never stored.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RefreshTokenRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields for a new refresh token row
#[derive(Debug, Clone)]
pub struct NewRefreshToken {
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

/// Store-level error
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database connection error: {0}")]
    Connection(#[from] sqlx::Error),
}

/// Persistence operations for refresh token rows.
///
/// All mutations are atomic single-row operations; rotation's delete+create
/// is two calls by design (single-use semantics tolerate the narrow race).
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    async fn insert(&self, token: NewRefreshToken) -> Result<RefreshTokenRecord, StoreError>;

    async fn find_by_hash(&self, token_hash: &str)
        -> Result<Option<RefreshTokenRecord>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<RefreshTokenRecord>, StoreError>;

    async fn touch_last_used(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError>;

    /// Returns whether a row was deleted
    async fn delete_by_id(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Returns whether a row was deleted
    async fn delete_by_hash(&self, token_hash: &str) -> Result<bool, StoreError>;

    /// Returns the number of rows deleted
    async fn delete_all_for_user(&self, user_id: Uuid) -> Result<u64, StoreError>;
}

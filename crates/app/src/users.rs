//! Minimal user persistence for the login flow
//!
//! Login establishes or looks up the local identity for a verified Google
//! subject; refresh needs the email back for access token claims. Nothing
//! else about users lives in this service.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use lifelog_auth::StoreError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub google_sub: String,
    pub email: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Establish or refresh the local identity for a verified Google
    /// subject. Safe under concurrent first-logins.
    async fn upsert_google_user(
        &self,
        google_sub: &str,
        email: &str,
        name: Option<&str>,
    ) -> Result<UserRecord, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn upsert_google_user(
        &self,
        google_sub: &str,
        email: &str,
        name: Option<&str>,
    ) -> Result<UserRecord, StoreError> {
        let record: UserRecord = sqlx::query_as(
            r#"
            INSERT INTO users (id, google_sub, email, name, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            ON CONFLICT (google_sub)
            DO UPDATE SET email = EXCLUDED.email, name = EXCLUDED.name
            RETURNING id, google_sub, email, name, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(google_sub)
        .bind(email)
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError> {
        let record: Option<UserRecord> = sqlx::query_as(
            r#"
            SELECT id, google_sub, email, name, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }
}

/// In-memory user store for tests and demo wiring
#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<Uuid, UserRecord>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn upsert_google_user(
        &self,
        google_sub: &str,
        email: &str,
        name: Option<&str>,
    ) -> Result<UserRecord, StoreError> {
        let mut users = self.users.lock().unwrap();

        if let Some(existing) = users.values_mut().find(|u| u.google_sub == google_sub) {
            existing.email = email.to_string();
            existing.name = name.map(str::to_string);
            return Ok(existing.clone());
        }

        let record = UserRecord {
            id: Uuid::new_v4(),
            google_sub: google_sub.to_string(),
            email: email.to_string(),
            name: name.map(str::to_string),
            created_at: Utc::now(),
        };
        users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }
}

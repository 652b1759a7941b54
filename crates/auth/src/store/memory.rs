//! In-memory refresh token store
//!
//! Store substitute for tests and local demo wiring. Same observable
//! semantics as the Postgres store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use super::{NewRefreshToken, RefreshTokenRecord, RefreshTokenStore, StoreError};

#[derive(Default)]
pub struct MemoryRefreshTokenStore {
    rows: Mutex<HashMap<Uuid, RefreshTokenRecord>>,
}

impl MemoryRefreshTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows currently held (test assertions)
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RefreshTokenStore for MemoryRefreshTokenStore {
    async fn insert(&self, token: NewRefreshToken) -> Result<RefreshTokenRecord, StoreError> {
        let record = RefreshTokenRecord {
            id: Uuid::new_v4(),
            user_id: token.user_id,
            token_hash: token.token_hash,
            expires_at: token.expires_at,
            last_used_at: None,
            user_agent: token.user_agent,
            ip_address: token.ip_address,
            created_at: Utc::now(),
        };

        self.rows.lock().unwrap().insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_by_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshTokenRecord>, StoreError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.values().find(|r| r.token_hash == token_hash).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<RefreshTokenRecord>, StoreError> {
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn touch_last_used(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError> {
        if let Some(record) = self.rows.lock().unwrap().get_mut(&id) {
            record.last_used_at = Some(at);
        }
        Ok(())
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.rows.lock().unwrap().remove(&id).is_some())
    }

    async fn delete_by_hash(&self, token_hash: &str) -> Result<bool, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        let id = rows
            .values()
            .find(|r| r.token_hash == token_hash)
            .map(|r| r.id);
        Ok(id.and_then(|id| rows.remove(&id)).is_some())
    }

    async fn delete_all_for_user(&self, user_id: Uuid) -> Result<u64, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|_, r| r.user_id != user_id);
        Ok((before - rows.len()) as u64)
    }
}

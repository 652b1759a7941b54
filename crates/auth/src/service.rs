//! Refresh token lifecycle operations
//!
//! Row lifecycle: created at login, `last_used_at` touched on each
//! successful validation, deleted and replaced on rotation, deleted on
//! logout or logout-all. Rows never leave a terminal state.
//!
//! Expired, missing, and already-rotated tokens all surface as `Ok(None)`.
//! The single throwing case is rotating a row that does not exist
//! ([`AuthError::RotatedTokenMissing`]); callers only rotate tokens they
//! just validated, so absence there is a logic bug, not a runtime state.

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::metadata::TokenMetadata;
use crate::refresh::{generate_refresh_token, hash_refresh_token};
use crate::store::{NewRefreshToken, RefreshTokenStore};

/// Identity binding returned by a successful refresh token validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTokenIdentity {
    pub user_id: Uuid,
    pub token_id: Uuid,
}

/// Issue a new refresh token for a user.
///
/// Returns the plaintext, the only moment it is observable. Only its hash
/// reaches the store.
pub async fn create_refresh_token<S: RefreshTokenStore + ?Sized>(
    store: &S,
    config: &AuthConfig,
    user_id: Uuid,
    metadata: TokenMetadata,
) -> Result<String, AuthError> {
    let plaintext = generate_refresh_token()?;
    let expires_at = Utc::now() + Duration::days(config.refresh_ttl_days);

    store
        .insert(NewRefreshToken {
            user_id,
            token_hash: hash_refresh_token(&plaintext),
            expires_at,
            user_agent: metadata.user_agent,
            ip_address: metadata.ip_address,
        })
        .await?;

    tracing::debug!(user_id = %user_id, "Issued refresh token");
    Ok(plaintext)
}

/// Validate a presented refresh token.
///
/// Expired rows are purged eagerly here rather than left to a background
/// sweep; a second presentation of the same plaintext then misses the
/// lookup entirely. Valid rows get `last_used_at` updated.
pub async fn validate_refresh_token<S: RefreshTokenStore + ?Sized>(
    store: &S,
    plaintext: &str,
) -> Result<Option<RefreshTokenIdentity>, AuthError> {
    let hash = hash_refresh_token(plaintext);

    let Some(record) = store.find_by_hash(&hash).await? else {
        return Ok(None);
    };

    let now = Utc::now();
    if record.expires_at < now {
        store.delete_by_id(record.id).await?;
        tracing::debug!(user_id = %record.user_id, "Purged expired refresh token");
        return Ok(None);
    }

    store.touch_last_used(record.id, now).await?;

    Ok(Some(RefreshTokenIdentity {
        user_id: record.user_id,
        token_id: record.id,
    }))
}

/// Rotate a just-validated refresh token: delete the old row, issue a fresh
/// one for the same user, return the new plaintext.
///
/// Rotation-on-use bounds a stolen-but-unused token to a single use. A
/// concurrent duplicate use races the delete and sees row-not-found at
/// validation, never a silent re-validation.
pub async fn rotate_refresh_token<S: RefreshTokenStore + ?Sized>(
    store: &S,
    config: &AuthConfig,
    old_token_id: Uuid,
    metadata: TokenMetadata,
) -> Result<String, AuthError> {
    let record = store
        .find_by_id(old_token_id)
        .await?
        .ok_or(AuthError::RotatedTokenMissing)?;

    store.delete_by_id(record.id).await?;

    create_refresh_token(store, config, record.user_id, metadata).await
}

/// Revoke a single refresh token by plaintext. Idempotent; no matching
/// row is not an error.
pub async fn revoke_refresh_token<S: RefreshTokenStore + ?Sized>(
    store: &S,
    plaintext: &str,
) -> Result<(), AuthError> {
    let deleted = store.delete_by_hash(&hash_refresh_token(plaintext)).await?;
    if deleted {
        tracing::debug!("Revoked refresh token");
    }
    Ok(())
}

/// Revoke every refresh token for a user (logout all devices). Idempotent.
pub async fn revoke_all_user_tokens<S: RefreshTokenStore + ?Sized>(
    store: &S,
    user_id: Uuid,
) -> Result<(), AuthError> {
    let count = store.delete_all_for_user(user_id).await?;
    tracing::debug!(user_id = %user_id, count, "Revoked all refresh tokens for user");
    Ok(())
}

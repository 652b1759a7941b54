//! Token service for the Lifelog API
//!
//! Provides access token signing and verification, refresh token
//! issuance/rotation/revocation against an injected store, Google ID token
//! verification, and the request-facing helpers (bearer authentication,
//! refresh cookies, client metadata) the GraphQL surface is built on.

mod claims;
mod config;
pub mod cookie;
mod error;
mod google;
mod jwt;
mod metadata;
mod refresh;
mod service;
pub mod store;

pub use claims::{AccessTokenClaims, GoogleTokenPayload};
pub use config::AuthConfig;
pub use error::AuthError;
pub use google::GoogleVerifier;
pub use jwt::{
    authenticate_bearer, extract_bearer_token, generate_access_token, verify_access_token,
};
pub use metadata::{extract_token_metadata, TokenMetadata};
pub use refresh::{generate_refresh_token, hash_refresh_token};
pub use service::{
    create_refresh_token, revoke_all_user_tokens, revoke_refresh_token, rotate_refresh_token,
    validate_refresh_token, RefreshTokenIdentity,
};
pub use store::{
    MemoryRefreshTokenStore, NewRefreshToken, PgRefreshTokenStore, RefreshTokenRecord,
    RefreshTokenStore, StoreError,
};

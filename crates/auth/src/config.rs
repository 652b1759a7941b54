//! Token service configuration

/// Token service configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Symmetric secret for access token signing (HS256)
    pub jwt_secret: String,
    /// Access token lifetime in seconds
    pub access_ttl_secs: u64,
    /// Refresh token lifetime in days
    pub refresh_ttl_days: i64,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            access_ttl_secs: 900,
            refresh_ttl_days: 30,
        }
    }
}

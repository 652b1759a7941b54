//! Client-side errors

/// Errors surfaced by the GraphQL transport.
///
/// Refresh failures themselves never take this form; the cache resolves
/// them to `None` ("treat as logged out"); `AuthRequired` is what the
/// transport reports after a refresh-and-replay attempt has failed.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response body: {0}")]
    InvalidResponse(#[from] serde_json::Error),

    #[error("Authentication required")]
    AuthRequired,
}

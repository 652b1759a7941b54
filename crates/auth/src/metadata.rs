//! Client metadata extraction for refresh token rows

use axum::http::{header, HeaderMap};

/// Optional client metadata recorded against a refresh token
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenMetadata {
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

/// Read client metadata from request headers.
///
/// User agent is taken verbatim. For the IP, `x-forwarded-for` wins with
/// its left-most hop (the originating client); `x-real-ip` is the
/// fallback. Both absent yields `None`, not an empty string.
pub fn extract_token_metadata(headers: &HeaderMap) -> TokenMetadata {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let forwarded_for = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|hop| hop.trim().to_string())
        .filter(|hop| !hop.is_empty());

    let ip_address = forwarded_for.or_else(|| {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    });

    TokenMetadata {
        user_agent,
        ip_address,
    }
}

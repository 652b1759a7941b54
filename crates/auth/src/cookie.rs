//! Refresh cookie helpers
//!
//! The refresh token travels exclusively as an httpOnly cookie scoped to
//! the GraphQL endpoint, never in a header or request body.

use axum::http::{header, HeaderMap};

/// Cookie name for the refresh token (long-lived, rotated on use).
pub const REFRESH_COOKIE_NAME: &str = "refresh_token";

/// Extract a cookie value from the Cookie header.
pub fn get_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    for part in cookie_header.split(';') {
        let part = part.trim();
        if let Some((key, value)) = part.split_once('=') {
            if key.trim() == name {
                return Some(value.trim());
            }
        }
    }
    None
}

/// Build the Set-Cookie value carrying a freshly issued refresh token.
pub fn build_refresh_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Max-Age={}; Path=/graphql; HttpOnly; SameSite=Lax",
        REFRESH_COOKIE_NAME, token, max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Build the Set-Cookie value that clears the refresh cookie.
pub fn build_clear_cookie(secure: bool) -> String {
    let mut cookie = format!(
        "{}=; Max-Age=0; Path=/graphql; HttpOnly; SameSite=Lax",
        REFRESH_COOKIE_NAME
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

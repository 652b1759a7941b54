//! Wire contract constants shared by client and server halves

/// `extensions.code` signaling an expired/invalid access token; the sole
/// trigger for client-side refresh-and-replay.
pub const CODE_UNAUTHORIZED: &str = "UNAUTHORIZED";

/// Payload error code for a refresh attempt with no refresh cookie.
/// Expected for anonymous/logged-out sessions; clients keep it out of logs.
pub const CODE_NO_REFRESH_TOKEN: &str = "NO_REFRESH_TOKEN";

/// Payload error code for a rejected Google login.
pub const CODE_UNAUTHENTICATED: &str = "UNAUTHENTICATED";

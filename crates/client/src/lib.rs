//! Client-side auth for the Lifelog API
//!
//! Holds the current access token in memory, brokers every consumer's need
//! for "a currently valid token" through a single-flight refresh, replays
//! operations that fail with `UNAUTHORIZED`, and exposes the auth session
//! contract the UI layer consumes.
//!
//! Nothing sensitive leaves process memory: access tokens are never
//! persisted, and the refresh token only ever travels as the httpOnly
//! cookie the server manages.

mod cache;
mod clock;
mod error;
mod refresher;
mod replay;
mod session;
mod transport;

pub use cache::{TokenCache, BUFFER_SECONDS, DEFAULT_LIFETIME_SECONDS};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::ClientError;
pub use refresher::{HttpRefresher, TokenRefresher, REFRESH_TOKEN_MUTATION};
pub use replay::RefreshCoordinator;
pub use session::{AuthSession, MemoryProfileStore, ProfileStore, UserProfile};
pub use transport::{AuthFailureHandler, GraphqlClient};

//! Session middleware configuration.
//!
//! Sets up in-memory server-side sessions using tower-sessions. The
//! session only carries the signed-in administrator; losing sessions on
//! restart just means signing in again.

use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::AdminConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "dispatch_session";

/// Session expiry time in seconds (24 hours of inactivity).
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

/// Create the session layer.
///
/// Cookies are `HttpOnly` and `SameSite=Strict`; every state-changing
/// route is a same-site form POST, so strict costs nothing and blocks
/// cross-site request forgery outright.
#[must_use]
pub fn create_session_layer(config: &AdminConfig) -> SessionManagerLayer<MemoryStore> {
    let store = MemoryStore::default();

    // Secure cookies when served over HTTPS
    let is_secure = config.base_url.starts_with("https://");

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
}

//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use dispatch_core::Email;

/// Session-stored administrator identity.
///
/// Written only after the role guard has accepted the profile; its
/// presence in the session is the capability that admits requests past
/// the session boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// Auth identity uid (also the profile document key).
    pub uid: String,
    /// Display name from the profile.
    pub name: String,
    /// Email the session was established for.
    pub email: Email,
}

/// Session keys for authentication data.
pub mod session_keys {
    /// Key for storing the current logged-in administrator.
    pub const CURRENT_ADMIN: &str = "current_admin";
    /// Key for storing the provider session token, used at logout.
    pub const ID_TOKEN: &str = "id_token";
}

//! Identity provider access.
//!
//! Wraps the managed authentication service behind the [`IdentityProvider`]
//! trait: email/password sign-in, account creation, sign-out, and the
//! account delete used by the registration rollback. Two implementations:
//! [`FirebaseAuthClient`] (Identity Toolkit REST v1) and [`MemoryIdentity`]
//! for tests and the `memory` backend.

pub mod firebase;
pub mod memory;

use async_trait::async_trait;
use secrecy::SecretString;
use thiserror::Error;

use dispatch_core::Email;

pub use firebase::FirebaseAuthClient;
pub use memory::MemoryIdentity;

/// Errors returned by the identity provider.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Wrong password or unknown email.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An account with this email already exists.
    #[error("an account with this email already exists")]
    EmailExists,

    /// HTTP transport failure (includes request timeouts).
    #[error("identity request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider rejected the request for another reason.
    #[error("identity provider error: {0}")]
    Api(String),
}

/// An authenticated session issued by the provider.
///
/// The session token is the capability threaded explicitly through
/// protected calls; it is never stored in ambient global state.
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// Provider-assigned identity key. Administrator profile documents are
    /// keyed by this value.
    pub uid: String,
    /// Session token issued at sign-in.
    pub id_token: SecretString,
    /// Email the session was established for.
    pub email: Email,
}

/// Email/password authentication service contract.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchange credentials for a session.
    async fn sign_in(&self, email: &Email, password: &str) -> Result<AuthSession, IdentityError>;

    /// Create a new account and return its initial session.
    async fn create_account(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<AuthSession, IdentityError>;

    /// Invalidate the session. Best effort; callers treat failures as
    /// non-fatal and discard the token locally regardless.
    async fn sign_out(&self, id_token: &SecretString) -> Result<(), IdentityError>;

    /// Delete the account the token belongs to. Used as the compensating
    /// action when profile creation fails after account creation.
    async fn delete_account(&self, id_token: &SecretString) -> Result<(), IdentityError>;
}

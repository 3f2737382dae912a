//! Identity gateway: sign-in, registration, and the role guard.
//!
//! Authentication proves who the caller is; the `users` profile document
//! decides whether they may use the console. Both checks live here so the
//! HTTP layer only ever sees a pass/fail.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};

use dispatch_core::{Email, EmailError, Gender};

use crate::authn::{AuthSession, IdentityError, IdentityProvider};
use crate::models::admin::ADMIN_ROLE;
use crate::models::{AdminProfile, CurrentAdmin};
use crate::store::{DocumentStore, StoreError, collections};

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Errors surfaced by authentication and registration.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Input rejected before any external call was made.
    #[error("{0}")]
    Validation(String),

    /// Wrong password or unknown email. Deliberately does not say which.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Registration against an email that already has an account.
    #[error("an account with this email already exists")]
    DuplicateEmail,

    /// The identity exists but no profile document does. The account
    /// cannot use the console until a profile is created out of band.
    #[error("no administrator profile exists for this account")]
    ProfileMissing,

    /// The profile exists but its role is not `admin`.
    #[error("this account is not an administrator")]
    NotAdmin,

    /// Identity provider failure other than a credential problem.
    #[error("authentication service error: {0}")]
    Identity(IdentityError),

    /// Document store failure with the system left unchanged.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Stored profile could not be decoded.
    #[error("data corruption: {0}")]
    Corrupt(String),

    /// Registration created an account but the rollback after a failed
    /// profile write also failed, leaving an identity with no profile.
    #[error("registration failed at {step}: {state}")]
    Partial {
        step: &'static str,
        state: &'static str,
    },
}

impl From<IdentityError> for AuthError {
    fn from(e: IdentityError) -> Self {
        match e {
            IdentityError::InvalidCredentials => Self::InvalidCredentials,
            IdentityError::EmailExists => Self::DuplicateEmail,
            other => Self::Identity(other),
        }
    }
}

impl From<EmailError> for AuthError {
    fn from(e: EmailError) -> Self {
        Self::Validation(e.to_string())
    }
}

/// Registration form input.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub gender: Gender,
    pub age: u8,
    pub address: String,
}

/// Gateway over the identity provider and the administrator profile store.
#[derive(Clone)]
pub struct IdentityGateway {
    provider: Arc<dyn IdentityProvider>,
    store: Arc<dyn DocumentStore>,
}

impl IdentityGateway {
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>, store: Arc<dyn DocumentStore>) -> Self {
        Self { provider, store }
    }

    /// Exchange credentials for a session, then run the role guard.
    ///
    /// Only sessions whose profile carries the `admin` role come back; a
    /// valid credential with the wrong role is rejected the same way at
    /// every entry point.
    #[instrument(skip(self, password))]
    pub async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(AuthSession, CurrentAdmin), AuthError> {
        let email = Email::parse(email)?;
        if password.is_empty() {
            return Err(AuthError::Validation("password is required".into()));
        }

        let session = self.provider.sign_in(&email, password).await?;
        let profile = self.authorize(&session).await?;

        info!(uid = %session.uid, "administrator signed in");
        let current = CurrentAdmin {
            uid: session.uid.clone(),
            name: profile.name,
            email: profile.email,
        };
        Ok((session, current))
    }

    /// Role guard: load the profile for a session and require the
    /// `admin` role.
    pub async fn authorize(&self, session: &AuthSession) -> Result<AdminProfile, AuthError> {
        self.profile(&session.uid).await
    }

    /// Load the administrator profile for a uid, requiring the `admin`
    /// role.
    pub async fn profile(&self, uid: &str) -> Result<AdminProfile, AuthError> {
        let Some(doc) = self.store.get(collections::USERS, uid).await? else {
            return Err(AuthError::ProfileMissing);
        };
        let profile: AdminProfile = serde_json::from_value(doc)
            .map_err(|e| AuthError::Corrupt(format!("profile {uid}: {e}")))?;
        if !profile.is_admin() {
            return Err(AuthError::NotAdmin);
        }
        Ok(profile)
    }

    /// Create an account and its administrator profile.
    ///
    /// Two writes against two services with no shared transaction. If the
    /// profile write fails, the freshly created account is deleted again
    /// so a retry with the same email succeeds; if that rollback also
    /// fails, the orphaned identity is reported as a partial failure.
    #[instrument(skip(self, reg), fields(email = %reg.email))]
    pub async fn register(&self, reg: Registration) -> Result<(AuthSession, CurrentAdmin), AuthError> {
        let name = reg.name.trim();
        let phone = reg.phone.trim();
        let address = reg.address.trim();
        if name.is_empty() {
            return Err(AuthError::Validation("name is required".into()));
        }
        if phone.is_empty() {
            return Err(AuthError::Validation("phone is required".into()));
        }
        if address.is_empty() {
            return Err(AuthError::Validation("address is required".into()));
        }
        if reg.password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        if reg.age == 0 || reg.age > 120 {
            return Err(AuthError::Validation("age must be between 1 and 120".into()));
        }
        let email = Email::parse(&reg.email)?;

        let session = self.provider.create_account(&email, &reg.password).await?;

        let profile = AdminProfile {
            name: name.to_owned(),
            email: email.clone(),
            phone: phone.to_owned(),
            gender: reg.gender,
            role: ADMIN_ROLE.to_owned(),
            age: reg.age,
            address: address.to_owned(),
            is_new: true,
            created_at: Utc::now(),
            order_ids: Vec::new(),
        };
        let doc = serde_json::to_value(&profile)
            .map_err(|e| AuthError::Corrupt(format!("encode profile: {e}")))?;

        if let Err(write_err) = self.store.put(collections::USERS, &session.uid, doc).await {
            warn!(uid = %session.uid, error = %write_err, "profile write failed, rolling back account");
            return match self.provider.delete_account(&session.id_token).await {
                Ok(()) => Err(AuthError::Store(write_err)),
                Err(rollback_err) => {
                    warn!(uid = %session.uid, error = %rollback_err, "account rollback failed");
                    Err(AuthError::Partial {
                        step: "profile-write",
                        state: "account exists without an administrator profile",
                    })
                }
            };
        }

        info!(uid = %session.uid, "administrator registered");
        let current = CurrentAdmin {
            uid: session.uid.clone(),
            name: profile.name,
            email: profile.email,
        };
        Ok((session, current))
    }

    /// Invalidate the session with the provider. Best effort: a provider
    /// failure is logged and swallowed, since the local session is being
    /// destroyed either way.
    pub async fn sign_out(&self, uid: &str, id_token: &secrecy::SecretString) {
        if let Err(e) = self.provider.sign_out(id_token).await {
            warn!(uid, error = %e, "provider sign-out failed, discarding session anyway");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::authn::MemoryIdentity;
    use crate::store::MemoryStore;

    fn gateway() -> (IdentityGateway, Arc<MemoryIdentity>, Arc<MemoryStore>) {
        let provider = Arc::new(MemoryIdentity::new());
        let store = Arc::new(MemoryStore::new());
        (
            IdentityGateway::new(
                Arc::clone(&provider) as Arc<dyn IdentityProvider>,
                Arc::clone(&store) as Arc<dyn DocumentStore>,
            ),
            provider,
            store,
        )
    }

    fn registration() -> Registration {
        Registration {
            name: "Priya".into(),
            email: "priya@example.com".into(),
            password: "hunter22".into(),
            phone: "9990001111".into(),
            gender: Gender::Female,
            age: 29,
            address: "12 MG Road, Bengaluru".into(),
        }
    }

    #[tokio::test]
    async fn test_register_then_sign_in() {
        let (gw, _, _) = gateway();
        gw.register(registration()).await.unwrap();

        let (_, current) = gw.sign_in("priya@example.com", "hunter22").await.unwrap();
        assert_eq!(current.name, "Priya");
    }

    #[tokio::test]
    async fn test_sign_in_wrong_password() {
        let (gw, _, _) = gateway();
        gw.register(registration()).await.unwrap();

        assert!(matches!(
            gw.sign_in("priya@example.com", "wrong-pass").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let (gw, _, _) = gateway();
        gw.register(registration()).await.unwrap();

        assert!(matches!(
            gw.register(registration()).await,
            Err(AuthError::DuplicateEmail)
        ));
    }

    #[tokio::test]
    async fn test_short_password_rejected_before_any_call() {
        let (gw, provider, _) = gateway();
        let mut reg = registration();
        reg.password = "abc".into();

        assert!(matches!(
            gw.register(reg).await,
            Err(AuthError::Validation(_))
        ));
        assert_eq!(provider.account_count().await, 0);
    }

    #[tokio::test]
    async fn test_non_admin_role_is_rejected() {
        let (gw, _, store) = gateway();
        let (session, _) = gw.register(registration()).await.unwrap();

        // Demote the profile out of band.
        let mut doc = store
            .get(collections::USERS, &session.uid)
            .await
            .unwrap()
            .unwrap();
        doc["role"] = serde_json::json!("dispatcher");
        store
            .put(collections::USERS, &session.uid, doc)
            .await
            .unwrap();

        assert!(matches!(
            gw.sign_in("priya@example.com", "hunter22").await,
            Err(AuthError::NotAdmin)
        ));
    }

    #[tokio::test]
    async fn test_missing_profile_is_rejected() {
        let (gw, _, store) = gateway();
        let (session, _) = gw.register(registration()).await.unwrap();
        store.delete(collections::USERS, &session.uid).await.unwrap();

        assert!(matches!(
            gw.sign_in("priya@example.com", "hunter22").await,
            Err(AuthError::ProfileMissing)
        ));
    }
}

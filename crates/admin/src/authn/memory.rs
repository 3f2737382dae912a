//! In-memory implementation of [`IdentityProvider`].
//!
//! Accounts live in a mutex-guarded map keyed by email; tokens encode the
//! uid so `delete_account` can find its target. Used by tests and by the
//! `memory` backend for local development.

use std::collections::HashMap;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::Mutex;

use dispatch_core::Email;

use super::{AuthSession, IdentityError, IdentityProvider};

struct Account {
    uid: String,
    password: String,
}

/// In-process identity provider.
#[derive(Default)]
pub struct MemoryIdentity {
    accounts: Mutex<HashMap<String, Account>>,
    next_uid: Mutex<u32>,
}

impl MemoryIdentity {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of existing accounts. Lets tests observe the compensating
    /// delete performed by the registration flow.
    pub async fn account_count(&self) -> usize {
        self.accounts.lock().await.len()
    }

    fn token_for(uid: &str) -> SecretString {
        SecretString::from(format!("memory-token:{uid}"))
    }

    fn uid_of(token: &SecretString) -> Option<String> {
        token
            .expose_secret()
            .strip_prefix("memory-token:")
            .map(str::to_owned)
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentity {
    async fn sign_in(&self, email: &Email, password: &str) -> Result<AuthSession, IdentityError> {
        let accounts = self.accounts.lock().await;
        let account = accounts
            .get(email.as_str())
            .ok_or(IdentityError::InvalidCredentials)?;
        if account.password != password {
            return Err(IdentityError::InvalidCredentials);
        }
        Ok(AuthSession {
            uid: account.uid.clone(),
            id_token: Self::token_for(&account.uid),
            email: email.clone(),
        })
    }

    async fn create_account(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<AuthSession, IdentityError> {
        let mut accounts = self.accounts.lock().await;
        if accounts.contains_key(email.as_str()) {
            return Err(IdentityError::EmailExists);
        }

        let mut next = self.next_uid.lock().await;
        *next += 1;
        let uid = format!("mem-uid-{}", *next);
        drop(next);

        accounts.insert(
            email.as_str().to_owned(),
            Account {
                uid: uid.clone(),
                password: password.to_owned(),
            },
        );
        Ok(AuthSession {
            uid: uid.clone(),
            id_token: Self::token_for(&uid),
            email: email.clone(),
        })
    }

    async fn sign_out(&self, _id_token: &SecretString) -> Result<(), IdentityError> {
        Ok(())
    }

    async fn delete_account(&self, id_token: &SecretString) -> Result<(), IdentityError> {
        let uid = Self::uid_of(id_token)
            .ok_or_else(|| IdentityError::Api("unknown token format".to_owned()))?;
        let mut accounts = self.accounts.lock().await;
        accounts.retain(|_, account| account.uid != uid);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn email(s: &str) -> Email {
        Email::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_sign_in_requires_matching_password() {
        let idp = MemoryIdentity::new();
        idp.create_account(&email("a@b.c"), "hunter22").await.unwrap();

        assert!(idp.sign_in(&email("a@b.c"), "hunter22").await.is_ok());
        assert!(matches!(
            idp.sign_in(&email("a@b.c"), "wrong").await,
            Err(IdentityError::InvalidCredentials)
        ));
        assert!(matches!(
            idp.sign_in(&email("x@b.c"), "hunter22").await,
            Err(IdentityError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let idp = MemoryIdentity::new();
        idp.create_account(&email("a@b.c"), "hunter22").await.unwrap();
        assert!(matches!(
            idp.create_account(&email("a@b.c"), "other-pass").await,
            Err(IdentityError::EmailExists)
        ));
    }

    #[tokio::test]
    async fn test_delete_account_removes_entry() {
        let idp = MemoryIdentity::new();
        let session = idp.create_account(&email("a@b.c"), "hunter22").await.unwrap();
        idp.delete_account(&session.id_token).await.unwrap();
        assert_eq!(idp.account_count().await, 0);
    }
}

//! Identity Toolkit REST v1 implementation of [`IdentityProvider`].

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use dispatch_core::Email;

use super::{AuthSession, IdentityError, IdentityProvider};
use crate::config::FirebaseConfig;

const IDENTITY_HOST: &str = "https://identitytoolkit.googleapis.com/v1";

/// Client for the Identity Toolkit REST API.
#[derive(Clone)]
pub struct FirebaseAuthClient {
    client: reqwest::Client,
    api_key: SecretString,
}

/// Successful sign-in/sign-up response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    local_id: String,
    id_token: String,
}

/// Error envelope returned by the REST API.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl FirebaseAuthClient {
    /// Create a new Identity Toolkit client with an explicit request
    /// timeout.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &FirebaseConfig, timeout: Duration) -> Result<Self, IdentityError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
        })
    }

    async fn call(
        &self,
        endpoint: &str,
        body: serde_json::Value,
    ) -> Result<reqwest::Response, IdentityError> {
        let response = self
            .client
            .post(format!("{IDENTITY_HOST}/accounts:{endpoint}"))
            .query(&[("key", self.api_key.expose_secret())])
            .json(&body)
            .send()
            .await?;
        Ok(response)
    }

    /// Map a non-success response to the error taxonomy.
    async fn error_for(response: reqwest::Response) -> IdentityError {
        let message = match response.json::<ApiErrorBody>().await {
            Ok(body) => body.error.message,
            Err(_) => return IdentityError::Api("(no error details provided)".to_owned()),
        };

        match message.as_str() {
            "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
                IdentityError::InvalidCredentials
            }
            "EMAIL_EXISTS" => IdentityError::EmailExists,
            other => IdentityError::Api(other.to_owned()),
        }
    }
}

#[async_trait]
impl IdentityProvider for FirebaseAuthClient {
    async fn sign_in(&self, email: &Email, password: &str) -> Result<AuthSession, IdentityError> {
        let response = self
            .call(
                "signInWithPassword",
                json!({
                    "email": email.as_str(),
                    "password": password,
                    "returnSecureToken": true,
                }),
            )
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }

        let token: TokenResponse = response.json().await?;
        debug!(uid = %token.local_id, "identity signed in");
        Ok(AuthSession {
            uid: token.local_id,
            id_token: SecretString::from(token.id_token),
            email: email.clone(),
        })
    }

    async fn create_account(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<AuthSession, IdentityError> {
        let response = self
            .call(
                "signUp",
                json!({
                    "email": email.as_str(),
                    "password": password,
                    "returnSecureToken": true,
                }),
            )
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }

        let token: TokenResponse = response.json().await?;
        debug!(uid = %token.local_id, "identity account created");
        Ok(AuthSession {
            uid: token.local_id,
            id_token: SecretString::from(token.id_token),
            email: email.clone(),
        })
    }

    async fn sign_out(&self, _id_token: &SecretString) -> Result<(), IdentityError> {
        // The provider has no sign-out endpoint; session tokens simply
        // expire. Discarding the token locally is all that is required.
        Ok(())
    }

    async fn delete_account(&self, id_token: &SecretString) -> Result<(), IdentityError> {
        let response = self
            .call("delete", json!({ "idToken": id_token.expose_secret() }))
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_token_response_parses_camel_case() {
        let token: TokenResponse = serde_json::from_value(json!({
            "localId": "uid-123",
            "idToken": "tok",
            "email": "admin@example.com",
            "expiresIn": "3600",
        }))
        .unwrap();
        assert_eq!(token.local_id, "uid-123");
    }
}

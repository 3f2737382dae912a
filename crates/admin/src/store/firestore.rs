//! Firestore REST v1 implementation of [`DocumentStore`].
//!
//! Documents live under
//! `projects/{project}/databases/(default)/documents/{collection}/{key}`.
//! Full overwrites and partial updates both use the PATCH endpoint (the
//! latter with an `updateMask`), and ordered listing goes through
//! `:runQuery` because the plain list endpoint cannot order by document
//! fields. Value conversion is handled by [`super::codec`].

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use super::codec::{from_fields, to_fields};
use super::{DocumentStore, StoreError};
use crate::config::FirebaseConfig;

const FIRESTORE_HOST: &str = "https://firestore.googleapis.com/v1";

/// Client for the Firestore REST API.
#[derive(Clone)]
pub struct FirestoreStore {
    client: reqwest::Client,
    /// `.../projects/{project}/databases/(default)/documents`
    documents_root: String,
    api_key: SecretString,
}

/// A document as returned by the REST API.
#[derive(Debug, Deserialize)]
struct FirestoreDocument {
    name: String,
    #[serde(default)]
    fields: serde_json::Map<String, Value>,
}

/// One entry of a `:runQuery` response stream.
#[derive(Debug, Deserialize)]
struct RunQueryEntry {
    document: Option<FirestoreDocument>,
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

impl FirestoreStore {
    /// Create a new Firestore client.
    ///
    /// The request timeout applies to every store call so a stalled remote
    /// call surfaces as a retryable failure instead of hanging the UI
    /// action.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &FirebaseConfig, timeout: Duration) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            documents_root: format!(
                "{FIRESTORE_HOST}/projects/{}/databases/(default)/documents",
                config.project_id
            ),
            api_key: config.api_key.clone(),
        })
    }

    fn doc_url(&self, collection: &str, key: &str) -> String {
        format!("{}/{collection}/{key}", self.documents_root)
    }

    /// Convert a non-success response into a [`StoreError`].
    async fn error_for(response: reqwest::Response) -> StoreError {
        let status = response.status().as_u16();
        let message = match response.json::<ApiErrorBody>().await {
            Ok(body) => body.error.message,
            Err(_) => "(no error details provided)".to_owned(),
        };
        StoreError::Api { status, message }
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>, StoreError> {
        let response = self
            .client
            .get(self.doc_url(collection, key))
            .query(&[("key", self.api_key.expose_secret())])
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }

        let doc: FirestoreDocument = response.json().await?;
        Ok(Some(from_fields(&doc.fields)?))
    }

    async fn put(&self, collection: &str, key: &str, doc: Value) -> Result<(), StoreError> {
        // PATCH without an updateMask replaces the whole document.
        let response = self
            .client
            .patch(self.doc_url(collection, key))
            .query(&[("key", self.api_key.expose_secret())])
            .json(&json!({ "fields": to_fields(&doc)? }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }
        debug!(collection, key, "document written");
        Ok(())
    }

    async fn patch(&self, collection: &str, key: &str, fields: Value) -> Result<(), StoreError> {
        let field_map = to_fields(&fields)?;

        let mut query: Vec<(&str, String)> = vec![
            ("key", self.api_key.expose_secret().to_owned()),
            // Precondition so patching an absent document fails cleanly.
            ("currentDocument.exists", "true".to_owned()),
        ];
        for name in field_map.keys() {
            query.push(("updateMask.fieldPaths", name.clone()));
        }

        let response = self
            .client
            .patch(self.doc_url(collection, key))
            .query(&query)
            .json(&json!({ "fields": field_map }))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound);
        }
        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        let response = self
            .client
            .delete(self.doc_url(collection, key))
            .query(&[("key", self.api_key.expose_secret())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }
        debug!(collection, key, "document deleted");
        Ok(())
    }

    async fn list_all(
        &self,
        collection: &str,
        order_by: &str,
        ascending: bool,
    ) -> Result<Vec<(String, Value)>, StoreError> {
        let direction = if ascending { "ASCENDING" } else { "DESCENDING" };
        let body = json!({
            "structuredQuery": {
                "from": [{ "collectionId": collection }],
                "orderBy": [{
                    "field": { "fieldPath": order_by },
                    "direction": direction,
                }],
            }
        });

        let response = self
            .client
            .post(format!("{}:runQuery", self.documents_root))
            .query(&[("key", self.api_key.expose_secret())])
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }

        let entries: Vec<RunQueryEntry> = response.json().await?;
        let mut documents = Vec::with_capacity(entries.len());
        for entry in entries {
            // Entries without a document carry only a read timestamp.
            let Some(doc) = entry.document else { continue };
            let key = doc
                .name
                .rsplit('/')
                .next()
                .unwrap_or(doc.name.as_str())
                .to_owned();
            documents.push((key, from_fields(&doc.fields)?));
        }
        Ok(documents)
    }
}

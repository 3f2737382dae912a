//! Document store access for the admin console.
//!
//! The external document database is the single source of truth; the
//! application holds no durable state of its own. Every operation here is
//! a remote call, and registries re-query after each mutation instead of
//! maintaining a local cache.
//!
//! # Collections
//!
//! - `users` - Administrator profiles, keyed by auth identity uid
//! - `orders` - Order documents, keyed by `order-{id}`
//! - `deliveryGuys` - Delivery personnel, keyed by `deliveryGuy-{id}`
//!
//! Two backends implement [`DocumentStore`]: [`FirestoreStore`] (Firestore
//! REST v1) and [`MemoryStore`] (in-process, used by tests and the `memory`
//! backend for local development).

pub mod codec;
pub mod firestore;
pub mod memory;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub use firestore::FirestoreStore;
pub use memory::MemoryStore;

/// Collection names as persisted in the document database.
///
/// These are part of the wire contract with existing stored data.
pub mod collections {
    pub const USERS: &str = "users";
    pub const ORDERS: &str = "orders";
    pub const DELIVERY_GUYS: &str = "deliveryGuys";
}

/// Errors that can occur during document store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP transport failure (includes request timeouts).
    #[error("store request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The store rejected the request.
    #[error("store error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Referenced document does not exist.
    #[error("document not found")]
    NotFound,

    /// Stored data could not be decoded into the expected shape.
    #[error("data corruption: {0}")]
    Corrupt(String),
}

impl StoreError {
    /// Whether the caller may retry the operation.
    ///
    /// Timeouts and transport failures are retryable; rejections and
    /// corrupt data are not.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Http(_))
    }
}

/// Per-collection CRUD over an external document database.
///
/// Field names inside documents are the wire contract (see the model
/// types); implementations move `serde_json::Value` documents verbatim.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document by key. `Ok(None)` when the document is absent.
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>, StoreError>;

    /// Write a document, fully overwriting any existing content.
    async fn put(&self, collection: &str, key: &str, doc: Value) -> Result<(), StoreError>;

    /// Update only the given top-level fields of an existing document.
    ///
    /// Fails with [`StoreError::NotFound`] if the document is absent.
    async fn patch(&self, collection: &str, key: &str, fields: Value) -> Result<(), StoreError>;

    /// Delete a document. Deleting an absent document is not an error.
    async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError>;

    /// List all documents in a collection ordered by a field.
    ///
    /// Returns `(key, document)` pairs. A fresh snapshot on every call;
    /// there is no incremental sync.
    async fn list_all(
        &self,
        collection: &str,
        order_by: &str,
        ascending: bool,
    ) -> Result<Vec<(String, Value)>, StoreError>;
}

//! In-memory implementation of [`DocumentStore`].
//!
//! Backs the `memory` store backend for local development and every test
//! that exercises registry behavior. Semantics mirror the remote store:
//! full overwrites, top-level field patches with an existence
//! precondition, and ordered listing by a document field.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use super::{DocumentStore, StoreError};

/// In-process document store.
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, BTreeMap<String, Value>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Compare two field values for ordering purposes.
///
/// Numbers order numerically, strings lexicographically; everything else
/// falls back to its JSON rendering. Missing fields sort first.
fn compare_field(a: Option<&Value>, b: Option<&Value>) -> std::cmp::Ordering {
    use std::cmp::Ordering;

    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => match (a.as_str(), b.as_str()) {
                (Some(x), Some(y)) => x.cmp(y),
                _ => a.to_string().cmp(&b.to_string()),
            },
        },
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>, StoreError> {
        let collections = self.collections.lock().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(key))
            .cloned())
    }

    async fn put(&self, collection: &str, key: &str, doc: Value) -> Result<(), StoreError> {
        let mut collections = self.collections.lock().await;
        collections
            .entry(collection.to_owned())
            .or_default()
            .insert(key.to_owned(), doc);
        Ok(())
    }

    async fn patch(&self, collection: &str, key: &str, fields: Value) -> Result<(), StoreError> {
        let updates = fields
            .as_object()
            .ok_or_else(|| StoreError::Corrupt("patch fields must be a JSON object".to_owned()))?
            .clone();

        let mut collections = self.collections.lock().await;
        let doc = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(key))
            .ok_or(StoreError::NotFound)?;

        let obj = doc
            .as_object_mut()
            .ok_or_else(|| StoreError::Corrupt("stored document is not an object".to_owned()))?;
        for (name, value) in updates {
            obj.insert(name, value);
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        let mut collections = self.collections.lock().await;
        if let Some(docs) = collections.get_mut(collection) {
            docs.remove(key);
        }
        Ok(())
    }

    async fn list_all(
        &self,
        collection: &str,
        order_by: &str,
        ascending: bool,
    ) -> Result<Vec<(String, Value)>, StoreError> {
        let collections = self.collections.lock().await;
        let mut docs: Vec<(String, Value)> = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        docs.sort_by(|(_, a), (_, b)| compare_field(a.get(order_by), b.get(order_by)));
        if !ascending {
            docs.reverse();
        }
        Ok(docs)
    }
}

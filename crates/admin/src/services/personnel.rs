//! Delivery personnel registry.
//!
//! Owns the `deliveryGuys` collection: roster CRUD plus the
//! `orders_assigned` list that mirrors order assignments. The assignment
//! mutators are read-modify-write cycles against the remote store, so a
//! per-person async lock serializes them; concurrent assignments to the
//! same person queue instead of losing updates.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use dispatch_core::{Gender, OrderId, PersonId};

use crate::models::DeliveryPerson;
use crate::services::RegistryError;
use crate::store::{DocumentStore, StoreError, collections};

struct Inner {
    store: Arc<dyn DocumentStore>,
    /// One lock per person id, created on first use and never dropped.
    /// The roster is small (hundreds, not millions), so the map only
    /// grows by entries that were actually contended for.
    locks: Mutex<HashMap<PersonId, Arc<Mutex<()>>>>,
}

/// Registry over the delivery roster.
#[derive(Clone)]
pub struct PersonnelRegistry {
    inner: Arc<Inner>,
}

impl PersonnelRegistry {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                locks: Mutex::new(HashMap::new()),
            }),
        }
    }

    async fn lock_for(&self, id: PersonId) -> Arc<Mutex<()>> {
        let mut locks = self.inner.locks.lock().await;
        locks
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// List the whole roster, ordered by person id.
    pub async fn list(&self) -> Result<Vec<DeliveryPerson>, RegistryError> {
        let docs = self
            .inner
            .store
            .list_all(collections::DELIVERY_GUYS, "id", true)
            .await?;
        docs.into_iter()
            .map(|(key, doc)| {
                serde_json::from_value(doc)
                    .map_err(|e| RegistryError::Corrupt(format!("delivery person {key}: {e}")))
            })
            .collect()
    }

    /// Fetch one delivery person by document key.
    pub async fn get(&self, key: &str) -> Result<Option<DeliveryPerson>, RegistryError> {
        let Some(doc) = self.inner.store.get(collections::DELIVERY_GUYS, key).await? else {
            return Ok(None);
        };
        serde_json::from_value(doc)
            .map(Some)
            .map_err(|e| RegistryError::Corrupt(format!("delivery person {key}: {e}")))
    }

    /// Add a delivery person to the roster.
    ///
    /// Ids are allocated as one past the current maximum, starting the
    /// numbering at [`PersonId::ROSTER_START`] on an empty roster.
    #[instrument(skip(self), fields(name = %name))]
    pub async fn add(
        &self,
        name: &str,
        phone_number: &str,
        gender: Gender,
        profile_image: &str,
    ) -> Result<DeliveryPerson, RegistryError> {
        let name = name.trim();
        let phone_number = phone_number.trim();
        if name.is_empty() {
            return Err(RegistryError::Validation("name is required".into()));
        }
        if phone_number.is_empty() {
            return Err(RegistryError::Validation("phone number is required".into()));
        }

        let roster = self.list().await?;
        let id = roster
            .iter()
            .map(|p| p.id)
            .max()
            .map_or(PersonId::ROSTER_START, |max| {
                PersonId::new(max.as_i32() + 1)
            });

        let person = DeliveryPerson {
            id,
            name: name.to_owned(),
            phone_number: phone_number.to_owned(),
            gender,
            profile_image: profile_image.trim().to_owned(),
            orders_assigned: Vec::new(),
            created_at: Some(chrono::Utc::now()),
        };

        let doc = serde_json::to_value(&person)
            .map_err(|e| RegistryError::Corrupt(format!("encode delivery person: {e}")))?;
        self.inner
            .store
            .put(
                collections::DELIVERY_GUYS,
                &DeliveryPerson::doc_key(id),
                doc,
            )
            .await?;

        debug!(id = %id, "delivery person added");
        Ok(person)
    }

    /// Remove a delivery person by document key.
    ///
    /// Orders still pointing at the removed person keep their
    /// `delivery_boy_id` until reassigned or deleted; the roster is the
    /// only thing this touches.
    #[instrument(skip(self))]
    pub async fn remove(&self, key: &str) -> Result<(), RegistryError> {
        match self.inner.store.get(collections::DELIVERY_GUYS, key).await? {
            Some(_) => {}
            None => return Err(RegistryError::NotFound(format!("delivery person {key}"))),
        }
        self.inner
            .store
            .delete(collections::DELIVERY_GUYS, key)
            .await?;
        debug!(key, "delivery person removed");
        Ok(())
    }

    /// Record that `order` is now assigned to `person`.
    ///
    /// Idempotent: an id already present is not appended twice. A missing
    /// person is a silent no-op, matching how stale assignee references in
    /// existing data behave.
    pub async fn append_assignment(
        &self,
        person: PersonId,
        order: OrderId,
    ) -> Result<(), RegistryError> {
        self.mutate_assignments(person, |orders| {
            if !orders.contains(&order) {
                orders.push(order);
            }
        })
        .await
    }

    /// Record that `order` is no longer assigned to `person`.
    ///
    /// Removing an id that is not present, or from a missing person, is a
    /// silent no-op.
    pub async fn remove_assignment(
        &self,
        person: PersonId,
        order: OrderId,
    ) -> Result<(), RegistryError> {
        self.mutate_assignments(person, |orders| {
            orders.retain(|&o| o != order);
        })
        .await
    }

    async fn mutate_assignments(
        &self,
        person: PersonId,
        mutate: impl FnOnce(&mut Vec<OrderId>),
    ) -> Result<(), RegistryError> {
        let lock = self.lock_for(person).await;
        let _guard = lock.lock().await;

        let key = DeliveryPerson::doc_key(person);
        let Some(current) = self.get(&key).await? else {
            warn!(person = %person, "assignment update against missing delivery person, skipping");
            return Ok(());
        };

        let mut orders = current.orders_assigned.clone();
        mutate(&mut orders);
        if orders == current.orders_assigned {
            return Ok(());
        }

        let patch = self
            .inner
            .store
            .patch(
                collections::DELIVERY_GUYS,
                &key,
                json!({ "orders_assigned": orders }),
            )
            .await;
        match patch {
            Ok(()) => Ok(()),
            // The document vanished between the read and the patch; treat
            // it like the missing-person case above.
            Err(StoreError::NotFound) => {
                warn!(person = %person, "delivery person removed mid-update, skipping");
                Ok(())
            }
            Err(other) => Err(other.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn registry() -> PersonnelRegistry {
        PersonnelRegistry::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_first_person_gets_roster_start_id() {
        let reg = registry();
        let p = reg.add("Asha", "9990001111", Gender::Female, "").await.unwrap();
        assert_eq!(p.id, PersonId::ROSTER_START);
    }

    #[tokio::test]
    async fn test_ids_are_one_past_the_maximum() {
        let reg = registry();
        let a = reg.add("Asha", "9990001111", Gender::Female, "").await.unwrap();
        let b = reg.add("Ravi", "9990002222", Gender::Male, "").await.unwrap();
        assert_eq!(b.id, PersonId::new(a.id.as_i32() + 1));

        // Removing the latest person frees its id for reuse.
        reg.remove(&DeliveryPerson::doc_key(b.id)).await.unwrap();
        let c = reg.add("Meena", "9990003333", Gender::Female, "").await.unwrap();
        assert_eq!(c.id, b.id);
    }

    #[tokio::test]
    async fn test_add_rejects_blank_fields() {
        let reg = registry();
        assert!(matches!(
            reg.add("  ", "9990001111", Gender::Other, "").await,
            Err(RegistryError::Validation(_))
        ));
        assert!(matches!(
            reg.add("Asha", "", Gender::Female, "").await,
            Err(RegistryError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_remove_missing_person_is_not_found() {
        let reg = registry();
        assert!(matches!(
            reg.remove("deliveryGuy-501").await,
            Err(RegistryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_append_assignment_is_idempotent() {
        let reg = registry();
        let p = reg.add("Asha", "9990001111", Gender::Female, "").await.unwrap();

        reg.append_assignment(p.id, OrderId::new(7)).await.unwrap();
        reg.append_assignment(p.id, OrderId::new(7)).await.unwrap();

        let roster = reg.list().await.unwrap();
        assert_eq!(roster[0].orders_assigned, vec![OrderId::new(7)]);
    }

    #[tokio::test]
    async fn test_assignment_against_missing_person_is_a_no_op() {
        let reg = registry();
        reg.append_assignment(PersonId::new(900), OrderId::new(1))
            .await
            .unwrap();
        reg.remove_assignment(PersonId::new(900), OrderId::new(1))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_appends_do_not_lose_updates() {
        let reg = registry();
        let p = reg.add("Asha", "9990001111", Gender::Female, "").await.unwrap();

        let mut handles = Vec::new();
        for n in 1..=8 {
            let reg = reg.clone();
            let id = p.id;
            handles.push(tokio::spawn(async move {
                reg.append_assignment(id, OrderId::new(n)).await
            }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }

        let roster = reg.list().await.unwrap();
        assert_eq!(roster[0].orders_assigned.len(), 8);
    }
}

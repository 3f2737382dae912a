//! Cross-registry integration tests: order/personnel linkage and the
//! behavior of multi-write sequences when the store fails midway.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;

use dispatch_admin::models::{Address, Coordinates, Order};
use dispatch_admin::services::{NewOrder, OrderRegistry, PersonnelRegistry, RegistryError};
use dispatch_admin::store::{DocumentStore, MemoryStore, StoreError, collections};
use dispatch_core::{Gender, OrderStatus, PersonId};

/// Store wrapper that can be told to fail specific operations on a
/// specific collection, to exercise partial-failure reporting.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    fail_patch_on: Mutex<Option<String>>,
    fail_delete_on: Mutex<Option<String>>,
}

impl FlakyStore {
    fn fail_patch_on(&self, collection: &str) {
        *self.fail_patch_on.lock().unwrap() = Some(collection.to_owned());
    }

    fn fail_delete_on(&self, collection: &str) {
        *self.fail_delete_on.lock().unwrap() = Some(collection.to_owned());
    }

    fn outage() -> StoreError {
        StoreError::Api {
            status: 503,
            message: "injected outage".to_owned(),
        }
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>, StoreError> {
        self.inner.get(collection, key).await
    }

    async fn put(&self, collection: &str, key: &str, doc: Value) -> Result<(), StoreError> {
        self.inner.put(collection, key, doc).await
    }

    async fn patch(&self, collection: &str, key: &str, fields: Value) -> Result<(), StoreError> {
        if self.fail_patch_on.lock().unwrap().as_deref() == Some(collection) {
            return Err(Self::outage());
        }
        self.inner.patch(collection, key, fields).await
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        if self.fail_delete_on.lock().unwrap().as_deref() == Some(collection) {
            return Err(Self::outage());
        }
        self.inner.delete(collection, key).await
    }

    async fn list_all(
        &self,
        collection: &str,
        order_by: &str,
        ascending: bool,
    ) -> Result<Vec<(String, Value)>, StoreError> {
        self.inner.list_all(collection, order_by, ascending).await
    }
}

fn registries_over(store: Arc<FlakyStore>) -> (OrderRegistry, PersonnelRegistry) {
    let store: Arc<dyn DocumentStore> = store;
    let personnel = PersonnelRegistry::new(Arc::clone(&store));
    (OrderRegistry::new(store, personnel.clone()), personnel)
}

fn sample_order(assignee: Option<PersonId>) -> NewOrder {
    NewOrder {
        product_name: "Filter Coffee Pack".into(),
        product_description: "500g ground".into(),
        category: "Food".into(),
        amount: Decimal::new(320, 0),
        address: Address {
            street: "4 Brigade Road".into(),
            city: "Bengaluru".into(),
            state: "Karnataka".into(),
            pincode: "560025".into(),
            coordinates: Coordinates {
                latitude: 12.97,
                longitude: 77.6,
            },
        },
        image: String::new(),
        delivery_boy_id: assignee,
    }
}

#[tokio::test]
async fn create_failure_after_order_write_names_the_failed_step() {
    let store = Arc::new(FlakyStore::default());
    let (orders, personnel) = registries_over(Arc::clone(&store));
    let p = personnel
        .add("Asha", "9990001111", Gender::Female, "")
        .await
        .unwrap();

    store.fail_patch_on(collections::DELIVERY_GUYS);
    let err = orders.create(sample_order(Some(p.id))).await.unwrap_err();

    match err {
        RegistryError::Partial { step, .. } => assert_eq!(step, "append-assignment"),
        other => panic!("expected partial failure, got {other}"),
    }

    // The order document was written before the failing step.
    let doc = store
        .get(collections::ORDERS, "order-1")
        .await
        .unwrap()
        .expect("order document should exist");
    let order: Order = serde_json::from_value(doc).unwrap();
    assert_eq!(order.status, OrderStatus::Assigned);
}

#[tokio::test]
async fn reassign_failure_on_order_patch_names_the_failed_step() {
    let store = Arc::new(FlakyStore::default());
    let (orders, personnel) = registries_over(Arc::clone(&store));
    let a = personnel
        .add("Asha", "9990001111", Gender::Female, "")
        .await
        .unwrap();
    let b = personnel
        .add("Ravi", "9990002222", Gender::Male, "")
        .await
        .unwrap();
    let order = orders.create(sample_order(Some(a.id))).await.unwrap();

    store.fail_patch_on(collections::ORDERS);
    let err = orders
        .assign(&Order::doc_key(order.id), b.id)
        .await
        .unwrap_err();

    match err {
        RegistryError::Partial { step, .. } => assert_eq!(step, "order-update"),
        other => panic!("expected partial failure, got {other}"),
    }

    // The person lists were already moved; the order record still points
    // at the old assignee. The error told the caller exactly that.
    let roster = personnel.list().await.unwrap();
    assert!(roster[0].orders_assigned.is_empty());
    assert_eq!(roster[1].orders_assigned, vec![order.id]);
}

#[tokio::test]
async fn delete_failure_after_detach_names_the_failed_step() {
    let store = Arc::new(FlakyStore::default());
    let (orders, personnel) = registries_over(Arc::clone(&store));
    let p = personnel
        .add("Asha", "9990001111", Gender::Female, "")
        .await
        .unwrap();
    let order = orders.create(sample_order(Some(p.id))).await.unwrap();

    store.fail_delete_on(collections::ORDERS);
    let err = orders.delete(&Order::doc_key(order.id)).await.unwrap_err();

    match err {
        RegistryError::Partial { step, .. } => assert_eq!(step, "order-delete"),
        other => panic!("expected partial failure, got {other}"),
    }

    // Detach happened first, so the surviving order is the only dangling
    // side of the link.
    let roster = personnel.list().await.unwrap();
    assert!(roster[0].orders_assigned.is_empty());
    assert!(
        store
            .get(collections::ORDERS, &Order::doc_key(order.id))
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn linkage_stays_bidirectional_through_a_workflow() {
    let store = Arc::new(FlakyStore::default());
    let (orders, personnel) = registries_over(store);

    let a = personnel
        .add("Asha", "9990001111", Gender::Female, "")
        .await
        .unwrap();
    let b = personnel
        .add("Ravi", "9990002222", Gender::Male, "")
        .await
        .unwrap();

    let o1 = orders.create(sample_order(Some(a.id))).await.unwrap();
    let o2 = orders.create(sample_order(None)).await.unwrap();
    orders.assign(&Order::doc_key(o2.id), a.id).await.unwrap();
    orders.assign(&Order::doc_key(o1.id), b.id).await.unwrap();
    orders.delete(&Order::doc_key(o2.id)).await.unwrap();

    // Every order's assignee lists it, and every listed order exists with
    // a matching delivery_boy_id.
    let all_orders = orders.list().await.unwrap();
    let roster = personnel.list().await.unwrap();
    for order in &all_orders {
        if let Some(pid) = order.delivery_boy_id {
            let person = roster.iter().find(|p| p.id == pid).unwrap();
            assert!(person.orders_assigned.contains(&order.id));
        }
    }
    for person in &roster {
        for oid in &person.orders_assigned {
            let order = all_orders.iter().find(|o| o.id == *oid).unwrap();
            assert_eq!(order.delivery_boy_id, Some(person.id));
        }
    }

    assert!(roster[0].orders_assigned.is_empty());
    assert_eq!(roster[1].orders_assigned, vec![o1.id]);
}

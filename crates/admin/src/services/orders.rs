//! Order registry.
//!
//! Owns the `orders` collection and keeps the bidirectional linkage with
//! the delivery roster consistent: every mutation that touches
//! `delivery_boy_id` also updates the person's `orders_assigned` list
//! through [`PersonnelRegistry`]. The store has no transactions, so a
//! multi-write sequence that fails midway surfaces as
//! [`RegistryError::Partial`] naming the failed step and the state left
//! behind, rather than pretending nothing happened.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::json;
use tracing::{debug, instrument};

use dispatch_core::{OrderId, OrderStatus, PersonId, SubmitterId};

use crate::models::{Address, Order};
use crate::services::{PersonnelRegistry, RegistryError};
use crate::store::{DocumentStore, collections};

/// Input for creating an order from the console form.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub product_name: String,
    pub product_description: String,
    pub category: String,
    pub amount: Decimal,
    pub address: Address,
    pub image: String,
    /// Assigning at creation time is optional; without it the order is
    /// created pending.
    pub delivery_boy_id: Option<PersonId>,
}

/// Registry over the orders collection.
#[derive(Clone)]
pub struct OrderRegistry {
    store: Arc<dyn DocumentStore>,
    personnel: PersonnelRegistry,
}

impl OrderRegistry {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, personnel: PersonnelRegistry) -> Self {
        Self { store, personnel }
    }

    /// List all orders, ordered by order id.
    pub async fn list(&self) -> Result<Vec<Order>, RegistryError> {
        let docs = self.store.list_all(collections::ORDERS, "id", true).await?;
        docs.into_iter()
            .map(|(key, doc)| {
                serde_json::from_value(doc)
                    .map_err(|e| RegistryError::Corrupt(format!("order {key}: {e}")))
            })
            .collect()
    }

    async fn fetch(&self, key: &str) -> Result<Order, RegistryError> {
        let Some(doc) = self.store.get(collections::ORDERS, key).await? else {
            return Err(RegistryError::NotFound(format!("order {key}")));
        };
        serde_json::from_value(doc)
            .map_err(|e| RegistryError::Corrupt(format!("order {key}: {e}")))
    }

    /// Create an order.
    ///
    /// The id is the current order count plus one. When an assignee is
    /// chosen up front the order is written `assigned` and the person's
    /// list is updated; otherwise it is written `pending` with no
    /// assignee.
    #[instrument(skip(self, new), fields(product = %new.product_name))]
    pub async fn create(&self, new: NewOrder) -> Result<Order, RegistryError> {
        let product_name = new.product_name.trim();
        if product_name.is_empty() {
            return Err(RegistryError::Validation("product name is required".into()));
        }
        if new.amount < Decimal::ZERO {
            return Err(RegistryError::Validation(
                "amount must not be negative".into(),
            ));
        }

        let count = self.store.list_all(collections::ORDERS, "id", true).await?.len();
        let id = OrderId::new(i32::try_from(count).unwrap_or(i32::MAX).saturating_add(1));

        let status = if new.delivery_boy_id.is_some() {
            OrderStatus::Assigned
        } else {
            OrderStatus::Pending
        };
        let order = Order {
            id,
            order_date: Utc::now().date_naive(),
            delivery_date: String::new(),
            product_name: product_name.to_owned(),
            product_description: new.product_description.trim().to_owned(),
            category: new.category.trim().to_owned(),
            amount: new.amount,
            user_id: SubmitterId::CONSOLE,
            delivery_boy_id: new.delivery_boy_id,
            address: new.address,
            image: new.image.trim().to_owned(),
            status,
        };

        let doc = serde_json::to_value(&order)
            .map_err(|e| RegistryError::Corrupt(format!("encode order: {e}")))?;
        self.store
            .put(collections::ORDERS, &Order::doc_key(id), doc)
            .await?;

        if let Some(person) = new.delivery_boy_id {
            self.personnel
                .append_assignment(person, id)
                .await
                .map_err(|e| {
                    e.after_write(
                        "append-assignment",
                        "order written but missing from the assignee's list",
                    )
                })?;
        }

        debug!(id = %id, status = status.as_str(), "order created");
        Ok(order)
    }

    /// Assign (or reassign) an order to a delivery person.
    ///
    /// Sequence: detach from the previous assignee, attach to the new one,
    /// then patch the order's `delivery_boy_id` and `status`. Assigning to
    /// the current assignee is a no-op beyond re-asserting the status.
    #[instrument(skip(self))]
    pub async fn assign(&self, order_key: &str, person: PersonId) -> Result<Order, RegistryError> {
        let order = self.fetch(order_key).await?;
        let previous = order.delivery_boy_id.filter(|&p| p != person);

        if let Some(prev) = previous {
            // First mutation of the sequence; a failure here leaves
            // everything untouched, so no Partial tagging.
            self.personnel.remove_assignment(prev, order.id).await?;
        }

        self.personnel
            .append_assignment(person, order.id)
            .await
            .map_err(|e| {
                e.after_write(
                    "append-assignment",
                    "previous assignee detached but new assignee not attached",
                )
            })?;

        self.store
            .patch(
                collections::ORDERS,
                order_key,
                json!({
                    "delivery_boy_id": person,
                    "status": OrderStatus::Assigned,
                }),
            )
            .await
            .map_err(|e| {
                RegistryError::from(e).after_write(
                    "order-update",
                    "assignee lists updated but order record unchanged",
                )
            })?;

        debug!(order = %order.id, person = %person, "order assigned");
        Ok(Order {
            delivery_boy_id: Some(person),
            status: OrderStatus::Assigned,
            ..order
        })
    }

    /// Delete an order, detaching it from its assignee first so no
    /// `orders_assigned` list is left pointing at a dead order.
    #[instrument(skip(self))]
    pub async fn delete(&self, order_key: &str) -> Result<(), RegistryError> {
        let order = self.fetch(order_key).await?;

        if let Some(person) = order.delivery_boy_id {
            // Detach before deleting; failing here leaves the order fully
            // intact rather than half-removed.
            self.personnel.remove_assignment(person, order.id).await?;
        }

        self.store
            .delete(collections::ORDERS, order_key)
            .await
            .map_err(|e| {
                RegistryError::from(e).after_write(
                    "order-delete",
                    "assignee list updated but order record still present",
                )
            })?;

        debug!(order = %order.id, "order deleted");
        Ok(())
    }
}

//! Order document.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use dispatch_core::{OrderId, OrderStatus, PersonId, SubmitterId};

/// Delivery coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Postal address attached to an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub coordinates: Coordinates,
}

/// An order, stored in the `orders` collection keyed by `order-{id}`.
///
/// Invariant: `status == assigned` iff `delivery_boy_id` is a non-null
/// reference to an existing delivery person.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Calendar date the order was created (`YYYY-MM-DD`).
    pub order_date: NaiveDate,
    /// Blank until fulfilled. No operation in this console populates it.
    pub delivery_date: String,
    pub product_name: String,
    pub product_description: String,
    pub category: String,
    pub amount: Decimal,
    pub user_id: SubmitterId,
    pub delivery_boy_id: Option<PersonId>,
    pub address: Address,
    /// Optional image reference; empty string when not provided.
    pub image: String,
    pub status: OrderStatus,
}

impl Order {
    /// Document key for an order id.
    #[must_use]
    pub fn doc_key(id: OrderId) -> String {
        format!("order-{id}")
    }

    /// Whether the status field agrees with the assignee field.
    #[must_use]
    pub const fn status_is_consistent(&self) -> bool {
        matches!(
            (self.status, self.delivery_boy_id.is_some()),
            (OrderStatus::Assigned, true) | (OrderStatus::Pending, false)
        )
    }

    /// Whether this order is currently assigned to the given person.
    #[must_use]
    pub fn is_assigned_to(&self, person: PersonId) -> bool {
        self.delivery_boy_id == Some(person)
    }
}

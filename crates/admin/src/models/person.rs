//! Delivery person document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dispatch_core::{Gender, OrderId, PersonId};

/// A delivery person, stored in the `deliveryGuys` collection.
///
/// Invariant: `orders_assigned` equals, at all times a read is observed,
/// the set of order ids whose `delivery_boy_id` points to this person and
/// whose order record still exists. The order registry maintains this
/// through the personnel registry's assignment operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryPerson {
    pub id: PersonId,
    pub name: String,
    pub phone_number: String,
    pub gender: Gender,
    /// Optional profile image reference; empty string when not provided.
    pub profile_image: String,
    /// Unique order ids. Insertion order happens to be preserved but
    /// carries no meaning.
    pub orders_assigned: Vec<OrderId>,
    /// Absent on records created before this field existed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl DeliveryPerson {
    /// Document key for a delivery person id.
    #[must_use]
    pub fn doc_key(id: PersonId) -> String {
        format!("deliveryGuy-{id}")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_doc_key_format() {
        assert_eq!(
            DeliveryPerson::doc_key(PersonId::new(501)),
            "deliveryGuy-501"
        );
    }

    #[test]
    fn test_legacy_record_without_created_at() {
        // Records written by the previous console have no created_at.
        let person: DeliveryPerson = serde_json::from_value(json!({
            "id": 501,
            "name": "Asha",
            "phone_number": "9990001111",
            "gender": "Female",
            "profile_image": "",
            "orders_assigned": [1, 4],
        }))
        .unwrap();
        assert!(person.created_at.is_none());
        assert_eq!(
            person.orders_assigned,
            vec![OrderId::new(1), OrderId::new(4)]
        );

        // And serializing it back does not invent the field.
        let back = serde_json::to_value(&person).unwrap();
        assert!(back.get("created_at").is_none());
        assert!(back.get("phone_number").is_some());
    }
}

//! Administrator profile document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dispatch_core::{Email, Gender, OrderId};

/// The role value required to pass the role guard.
pub const ADMIN_ROLE: &str = "admin";

/// An administrator profile, stored in the `users` collection keyed by the
/// authentication identity uid.
///
/// Created once at registration. The `role` field is never mutated by this
/// system afterwards and is read-only at login time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminProfile {
    pub name: String,
    pub email: Email,
    pub phone: String,
    pub gender: Gender,
    /// Must equal `"admin"` to use the console. Kept as a free-form string
    /// because the store may hold profiles with other role values.
    pub role: String,
    pub age: u8,
    pub address: String,
    /// First-login flag, set at registration and never consulted again.
    #[serde(rename = "isNew")]
    pub is_new: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    /// Order references attached to this administrator.
    #[serde(rename = "orderid")]
    pub order_ids: Vec<OrderId>,
}

impl AdminProfile {
    /// Whether this profile passes the role guard.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_wire_field_names() {
        let profile: AdminProfile = serde_json::from_value(json!({
            "name": "Priya",
            "email": "priya@example.com",
            "phone": "9990001111",
            "gender": "Female",
            "role": "admin",
            "age": 29,
            "address": "12 MG Road, Bengaluru",
            "isNew": true,
            "createdAt": "2025-06-02T10:00:00Z",
            "orderid": [],
        }))
        .unwrap();

        assert!(profile.is_admin());

        let back = serde_json::to_value(&profile).unwrap();
        assert!(back.get("isNew").is_some());
        assert!(back.get("createdAt").is_some());
        assert!(back.get("orderid").is_some());
        // The administrator profile uses `phone`, not `phone_number`.
        assert!(back.get("phone").is_some());
        assert!(back.get("phone_number").is_none());
    }

    #[test]
    fn test_non_admin_role_fails_guard() {
        let profile: AdminProfile = serde_json::from_value(json!({
            "name": "Ravi",
            "email": "ravi@example.com",
            "phone": "9990002222",
            "gender": "Male",
            "role": "dispatcher",
            "age": 35,
            "address": "Pune",
            "isNew": false,
            "createdAt": "2025-06-02T10:00:00Z",
            "orderid": [],
        }))
        .unwrap();
        assert!(!profile.is_admin());
    }
}

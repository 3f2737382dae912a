//! Order status enum.

use serde::{Deserialize, Serialize};

/// Order assignment status.
///
/// The only two states the console ever produces. An order is `Assigned`
/// iff its `delivery_boy_id` points at an existing delivery person;
/// there is no transition back to `Pending` and no terminal
/// delivered/cancelled state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Assigned,
}

impl OrderStatus {
    /// Returns the wire representation stored in order documents.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Assigned => "assigned",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "assigned" => Ok(Self::Assigned),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_representation() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Assigned).unwrap(),
            "\"assigned\""
        );
        assert_eq!(
            serde_json::from_str::<OrderStatus>("\"pending\"").unwrap(),
            OrderStatus::Pending
        );
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        assert!("delivered".parse::<OrderStatus>().is_err());
    }
}

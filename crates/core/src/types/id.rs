//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types.

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `i32` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Ord`, `Hash`
/// - Conversion methods: `new()`, `as_i32()`
/// - `From<i32>` and `Into<i32>` implementations
///
/// # Example
///
/// ```rust
/// # use dispatch_core::define_id;
/// define_id!(PersonId);
/// define_id!(OrderId);
///
/// let person_id = PersonId::new(501);
/// let order_id = OrderId::new(1);
///
/// // These are different types, so this won't compile:
/// // let _: PersonId = order_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Create a new ID from an i32 value.
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// Get the underlying i32 value.
            #[must_use]
            pub const fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Define standard entity IDs
define_id!(OrderId);
define_id!(PersonId);
define_id!(SubmitterId);

impl PersonId {
    /// First id handed out when the delivery roster is empty.
    pub const ROSTER_START: Self = Self::new(501);
}

impl SubmitterId {
    /// Placeholder submitter for orders created from the admin console.
    pub const CONSOLE: Self = Self::new(999);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_transparent_in_json() {
        let id = OrderId::new(7);
        assert_eq!(serde_json::to_string(&id).unwrap(), "7");

        let parsed: PersonId = serde_json::from_str("501").unwrap();
        assert_eq!(parsed, PersonId::ROSTER_START);
    }

    #[test]
    fn test_display_and_conversions() {
        let id = PersonId::from(502);
        assert_eq!(id.to_string(), "502");
        assert_eq!(i32::from(id), 502);
        assert_eq!(id.as_i32(), 502);
    }

    #[test]
    fn test_ordering() {
        assert!(OrderId::new(1) < OrderId::new(2));
    }
}

//! Business services for the admin console.
//!
//! - [`identity`] - sign-in/registration gateway and the role guard
//! - [`personnel`] - delivery roster CRUD and the `orders_assigned` list
//! - [`orders`] - order CRUD and assignment linkage maintenance

pub mod identity;
pub mod orders;
pub mod personnel;

use thiserror::Error;

pub use identity::{AuthError, IdentityGateway, Registration};
pub use orders::{NewOrder, OrderRegistry};
pub use personnel::PersonnelRegistry;

use crate::store::StoreError;

/// Errors produced by the personnel and order registries.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// User input was rejected before any write happened.
    #[error("{0}")]
    Validation(String),

    /// Referenced document does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Store call failed before anything was written; the system is
    /// unchanged.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Stored data could not be decoded into the expected shape.
    #[error("data corruption: {0}")]
    Corrupt(String),

    /// A later step of a multi-write sequence failed after an earlier
    /// write succeeded. Names the failed step; `state` documents what the
    /// store was left looking like.
    #[error("partial failure at {step} ({state}): {source}")]
    Partial {
        step: &'static str,
        state: &'static str,
        source: StoreError,
    },
}

impl RegistryError {
    /// Re-tag an error raised after earlier writes in the same sequence
    /// already succeeded, so the caller sees which step failed instead of
    /// a silent inconsistency.
    #[must_use]
    pub fn after_write(self, step: &'static str, state: &'static str) -> Self {
        match self {
            Self::Store(source) => Self::Partial {
                step,
                state,
                source,
            },
            other => other,
        }
    }
}

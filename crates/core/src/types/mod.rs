//! Core types for Dispatch.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod gender;
pub mod id;
pub mod status;

pub use email::{Email, EmailError};
pub use gender::Gender;
pub use id::*;
pub use status::OrderStatus;

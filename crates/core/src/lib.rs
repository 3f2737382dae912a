//! Dispatch Core - Shared types library.
//!
//! This crate provides common types used across the Dispatch components:
//! - `admin` - The delivery-operations admin console
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no store access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

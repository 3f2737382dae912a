//! Domain models for the admin console.
//!
//! Field names on these types are the wire contract with documents already
//! persisted in the store and must not be renamed - including the
//! inconsistent `phone_number` (personnel) vs `phone` (administrator) and
//! the camelCase `isNew`/`createdAt`/`orderid` fields on the administrator
//! profile.

pub mod admin;
pub mod order;
pub mod person;
pub mod session;

pub use admin::AdminProfile;
pub use order::{Address, Coordinates, Order};
pub use person::DeliveryPerson;
pub use session::{CurrentAdmin, session_keys};

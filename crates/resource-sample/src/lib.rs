//! # Resource Sample
//!
//! A small shop built on the resource framework: users, products and orders
//! kept in memory and exposed as resources.
//!
//! - **[model]**: the entities ([`User`](model::User), [`Product`](model::Product),
//!   [`Order`](model::Order)) and their external IDs.
//! - **[store]**: in-memory repositories that also back reference resolution.
//! - **[resources]**: the resources and their error and action registries.
//! - **[lifecycle]**: [`AppSystem`](lifecycle::AppSystem), which wires the store,
//!   the entity catalog and the dispatcher together.

pub mod error;
pub mod identity;
pub mod lifecycle;
pub mod model;
pub mod resources;
pub mod store;

pub use error::AppError;

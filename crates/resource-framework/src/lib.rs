//! # Resource Framework
//!
//! The base contract every REST-exposed resource implements, independent of
//! the transport that routes requests to it.
//!
//! ## Architecture Overview
//!
//! The framework separates concerns into four layers, leaf first:
//!
//! 1. **Error Model** ([`ErrorRegistry`], [`ValidationError`]): each resource type
//!    declares the validation errors it can report, keyed by code. Errors are
//!    built by merging caller overrides over the registered defaults.
//! 2. **Validation Failure** ([`ValidationFailure`]): one or more errors carried out
//!    of a resource at once, so a request learns about every problem in one go.
//! 3. **Reference Resolver** ([`Resolver`], [`Reference`]): turns an ID, an external
//!    ID or a loaded object into whichever of the three forms is needed, for any
//!    entity type in the [`EntityCatalog`]. Entity-layer failures are replaced by
//!    the validation error the caller asked for.
//! 4. **Resource Contract** ([`Resource`], [`ResourceContext`], [`ActionRegistry`]):
//!    construction-time authorization and loading, the action metadata a router
//!    consumes, and the `output` / `error` / `add_error` / `access_denied` /
//!    `not_found` helpers.
//!
//! [`Dispatcher`] ties the layers together the way a router would: look up the
//! action, construct the resource, invoke the mapped method, wrap the output.
//!
//! ## Error Kinds
//!
//! Every failure is a [`ResourceError`]. Validation, access-denied and not-found
//! are meant for the client; [`InternalError`] always points at a defect in a
//! resource type's own definitions (unknown error code, unregistered entity
//! type, unsupported conversion) and is never shown as validation feedback.
//!
//! ## Concurrency Model
//!
//! One request builds one resource instance and runs it to completion on one
//! thread. Registries are initialized once per type and only read afterwards,
//! so any number of concurrent requests share them without locking. Per-request
//! state (staged errors, the response) belongs to the instance.
//!
//! ## Testing
//!
//! See the [`mock`] module for a repository double with fluent expectations.

pub mod action;
pub mod config;
pub mod dispatch;
pub mod entity;
pub mod error;
pub mod mock;
pub mod resolver;
pub mod resource;
pub mod response;
pub mod state;
pub mod tracing;
pub mod validation;

// Re-export core types for convenience
pub use action::{ActionDescriptor, ActionRegistry, ResolvedAction};
pub use config::{ConfigError, DispatchConfig};
pub use dispatch::{Dispatcher, Outcome};
pub use entity::{Entity, EntityCatalog, EntityId, EntityRepository, Reference, ReferenceKind};
pub use error::{EntityError, InternalError, ResourceError, ResourceResult, RoutingError};
pub use resolver::{ResolveError, Resolver};
pub use resource::{Resource, ResourceContext};
pub use response::{Identity, Response};
pub use state::SetFields;
pub use validation::{ErrorRegistry, ErrorSource, ValidationError, ValidationFailure};

#[doc(hidden)]
pub use paste::paste as __paste;

//! # Application Wiring
//!
//! [`AppSystem`] owns the store and a [`Dispatcher`](resource_framework::Dispatcher)
//! whose entity catalog points at the same repositories, so records written
//! by one action are resolvable by the next.
//!
//! ```rust
//! use resource_framework::DispatchConfig;
//! use resource_sample::identity::Caller;
//! use resource_sample::lifecycle::AppSystem;
//! use resource_sample::resources::{ProductInput, ProductResource};
//!
//! let system = AppSystem::new(DispatchConfig::default());
//! let outcome = system.call::<ProductResource, _>(
//!     "create",
//!     ProductInput {
//!         sku: Some("MUG-1".into()),
//!         name: Some("Mug".into()),
//!         price_cents: Some(900),
//!         ..Default::default()
//!     },
//!     Caller::admin("root"),
//! );
//! assert_eq!(outcome.status.as_u16(), 201);
//! assert_eq!(outcome.body["product"]["sku"], "MUG-1");
//! ```
//!
//! Logging is set up once by the binary through
//! [`setup_tracing`](resource_framework::tracing::setup_tracing); `RUST_LOG`
//! selects the level (`debug` also shows swallowed reference failures).

mod app_system;

pub use app_system::*;

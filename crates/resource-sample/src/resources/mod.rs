//! # Sample Resources
//!
//! Three resources over the in-memory [`Store`]:
//!
//! | Resource | Actions | Authorization |
//! |----------|---------|---------------|
//! | [`UserResource`] | `get`, `list`, `create`, `change_email` | own account, admins see all |
//! | [`ProductResource`] | `get`, `list`, `create`, `restock` | reads open, writes admin only |
//! | [`OrderResource`] | `get`, `list`, `place`, `cancel` | own orders, admins see all |
//!
//! Each resource receives a [`Request`] carrying the store handle and its
//! typed input. References in the input are loose JSON values (an ID, or an
//! external ID such as a username, SKU or order number) and are resolved
//! during construction.

pub mod order;
pub mod product;
pub mod user;

pub use order::{OrderInput, OrderResource, OrderView};
pub use product::{ProductInput, ProductResource};
pub use user::{UserInput, UserResource};

use crate::store::Store;
use resource_framework::{ResourceContext, ResourceResult};
use std::sync::Arc;

/// Parameters handed to every sample resource.
#[derive(Clone)]
pub struct Request<T> {
    pub store: Arc<Store>,
    pub input: T,
}

impl<T> Request<T> {
    pub fn new(store: Arc<Store>, input: T) -> Self {
        Self { store, input }
    }
}

/// Who is calling, as `(username, is_admin)`.
pub(crate) fn caller(context: &ResourceContext) -> ResourceResult<(String, bool)> {
    let identity = context.require_identity()?;
    Ok((
        identity.subject().to_string(),
        identity.has_role(crate::identity::Caller::ADMIN),
    ))
}

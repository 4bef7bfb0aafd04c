use crate::error::AppError;
use crate::identity::Caller;
use crate::model::{Product, User};
use crate::resources::Request;
use crate::store::Store;
use resource_framework::{DispatchConfig, Dispatcher, Identity, Outcome, Resource};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// The running application: store plus dispatcher.
#[derive(Clone)]
pub struct AppSystem {
    store: Arc<Store>,
    dispatcher: Dispatcher,
}

impl AppSystem {
    pub fn new(config: DispatchConfig) -> Self {
        let store = Arc::new(Store::new());
        let dispatcher = Dispatcher::new(Arc::new(store.catalog()), config);
        Self { store, dispatcher }
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Runs `action` on resource `R` as `caller`.
    pub fn call<R, I>(&self, action: &str, input: I, caller: Caller) -> Outcome
    where
        R: Resource<Params = Request<I>>,
    {
        let identity: Arc<dyn Identity> = Arc::new(caller);
        self.dispatcher.dispatch::<R>(
            action,
            Request::new(self.store.clone(), input),
            Some(identity),
        )
    }

    /// Like [`call`](Self::call), but a non-success outcome becomes an error.
    pub fn try_call<R, I>(&self, action: &str, input: I, caller: Caller) -> Result<Value, AppError>
    where
        R: Resource<Params = Request<I>>,
    {
        let outcome = self.call::<R, I>(action, input, caller);
        if outcome.is_success() {
            return Ok(outcome.body);
        }
        Err(AppError::Rejected {
            resource: R::NAME,
            action: action.to_string(),
            status: outcome.status,
            body: outcome.body,
        })
    }

    /// Stores a few users and products for demos and tests.
    pub fn seed(&self) {
        for (username, name) in [("alice", "Alice"), ("bob", "Bob")] {
            self.store.users.insert_with(|id| User {
                id,
                ..User::new(username, name, format!("{username}@example.com"))
            });
        }
        for (sku, name, price_cents, stock) in [
            ("WIDGET-1", "Widget", 2_550, 100),
            ("GADGET-1", "Gadget", 9_900, 3),
        ] {
            self.store.products.insert_with(|id| Product {
                id,
                ..Product::new(sku, name, price_cents, stock)
            });
        }
        info!(
            users = self.store.users.len(),
            products = self.store.products.len(),
            "Seeded store"
        );
    }
}

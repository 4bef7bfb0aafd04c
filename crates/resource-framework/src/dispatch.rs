//! # Dispatcher
//!
//! The in-process half of a router: given a resource type, an action name and
//! the already-parsed parameters, it
//!
//! 1. looks up the action and applies the descriptor defaults,
//! 2. constructs the resource (authorization and loading happen here),
//! 3. invokes the mapped method,
//! 4. wraps the recorded output under the action's wrapper key.
//!
//! Failures at any step become an [`Outcome`] carrying the failure's status
//! and JSON error body. Binding actions to HTTP verbs and paths stays with the
//! transport layer.

use crate::config::DispatchConfig;
use crate::entity::EntityCatalog;
use crate::error::{ResourceError, ResourceResult};
use crate::resource::{Resource, ResourceContext};
use crate::response::{Identity, Response};
use http::StatusCode;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn};

/// Status and body produced by one dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub status: StatusCode,
    pub body: Value,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Runs resource actions against a shared entity catalog.
///
/// Cheap to clone; every dispatch builds its own resource instance, so one
/// dispatcher can serve concurrent requests.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    catalog: Arc<EntityCatalog>,
    config: DispatchConfig,
}

impl Dispatcher {
    pub fn new(catalog: Arc<EntityCatalog>, config: DispatchConfig) -> Self {
        Self { catalog, config }
    }

    pub fn catalog(&self) -> &Arc<EntityCatalog> {
        &self.catalog
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// A context for constructing `R` outside of a dispatch.
    pub fn context<R: Resource>(&self, identity: Option<Arc<dyn Identity>>) -> ResourceContext {
        ResourceContext::new::<R>(self.catalog.clone(), identity)
    }

    /// Dispatches and renders failures into an [`Outcome`].
    pub fn dispatch<R: Resource>(
        &self,
        action: &str,
        params: R::Params,
        identity: Option<Arc<dyn Identity>>,
    ) -> Outcome {
        let span = info_span!("dispatch", resource = R::NAME, action);
        let _enter = span.enter();

        match self.try_dispatch::<R>(action, params, identity) {
            Ok(outcome) => {
                info!(status = outcome.status.as_u16(), "Action ok");
                outcome
            }
            Err(e) => self.render(&e),
        }
    }

    /// Dispatches and hands failures back to the caller.
    pub fn try_dispatch<R: Resource>(
        &self,
        action: &str,
        params: R::Params,
        identity: Option<Arc<dyn Identity>>,
    ) -> ResourceResult<Outcome> {
        let resolved = R::actions().resolve(action)?;
        debug!(
            method = %resolved.method,
            authenticated = identity.is_some(),
            "Constructing resource"
        );

        let mut resource = R::new(params, self.context::<R>(identity))?;
        resource.invoke(&resolved.method)?;

        let response = resource.context_mut().take_response().unwrap_or_default();
        let wrapper = resolved.wrapper.as_deref().filter(|_| self.config.wrap_responses);

        Ok(Outcome {
            status: resolved.status,
            body: Response::into_body(response, wrapper),
        })
    }

    pub fn render(&self, e: &ResourceError) -> Outcome {
        match e {
            ResourceError::Internal(_) => error!(error = %e, "Action failed"),
            ResourceError::Validation(_) | ResourceError::Routing(_) => {
                warn!(kind = e.kind(), error = %e, "Action rejected")
            }
            ResourceError::AccessDenied(_) | ResourceError::NotFound(_) => {
                info!(kind = e.kind(), error = %e, "Action rejected")
            }
        }
        Outcome {
            status: e.status(),
            body: e.to_body(self.config.expose_internal_errors),
        }
    }
}

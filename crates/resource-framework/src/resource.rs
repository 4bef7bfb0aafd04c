//! # Resource Contract
//!
//! A [`Resource`] is the unit a router invokes: one REST-addressable entity or
//! action family. A fresh instance is built for every invocation:
//!
//! 1. [`Resource::new`] authorizes the caller, resolves referenced records and
//!    populates the externally visible state, or fails.
//! 2. [`Resource::invoke`] runs the method the action registry mapped the
//!    action to.
//! 3. Whatever the method recorded through [`ResourceContext::output`] is
//!    serialized, optionally wrapped under the action's wrapper key.
//!
//! The per-invocation state every resource needs (caller identity, staged
//! errors, the response accumulator, access to the entity catalog) lives in
//! [`ResourceContext`], which each resource owns.

use crate::action::{ActionDescriptor, ActionRegistry};
use crate::entity::{Entity, EntityCatalog, EntityId, Reference, ReferenceKind};
use crate::error::{InternalError, ResourceError, ResourceResult, RoutingError};
use crate::resolver::{ResolveError, Resolver};
use crate::response::{Identity, Response};
use crate::validation::{ErrorRegistry, ErrorSource, ValidationError, ValidationFailure};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// The contract every concrete resource type implements.
///
/// Registries are per type and built once, typically behind a
/// `static OnceLock` inside [`Resource::possible_errors`] and [`Resource::actions`].
pub trait Resource: Sized {
    /// Name used in logs and error reports.
    const NAME: &'static str;

    /// Request parameters handed to the constructor.
    type Params;

    fn possible_errors() -> &'static ErrorRegistry;

    fn actions() -> &'static ActionRegistry;

    /// Authorizes and loads. Must either populate all externally visible
    /// state or fail with one of the [`ResourceError`] kinds.
    fn new(params: Self::Params, context: ResourceContext) -> ResourceResult<Self>;

    /// Calls the method named by a resolved action.
    ///
    /// Implementations answer unknown names with [`Resource::unknown_method`].
    fn invoke(&mut self, method: &str) -> ResourceResult<()>;

    fn context(&self) -> &ResourceContext;

    fn context_mut(&mut self) -> &mut ResourceContext;

    fn get_action(name: &str) -> Result<&'static ActionDescriptor, RoutingError> {
        Self::actions().get_action(name)
    }

    fn get_error(code: &str, overrides: Value) -> Result<ValidationError, InternalError> {
        Self::possible_errors().get_error(code, overrides)
    }

    fn unknown_method<T>(method: &str) -> ResourceResult<T> {
        Err(InternalError::UnknownMethod {
            resource: Self::NAME,
            method: method.to_string(),
        }
        .into())
    }
}

/// Per-invocation state shared by all resources.
#[derive(Debug)]
pub struct ResourceContext {
    resource: &'static str,
    registry: &'static ErrorRegistry,
    catalog: Arc<EntityCatalog>,
    identity: Option<Arc<dyn Identity>>,
    response: Option<Response>,
    errors: Vec<ValidationError>,
}

impl ResourceContext {
    /// `identity` is `None` only for direct, non-REST construction.
    pub fn new<R: Resource>(
        catalog: Arc<EntityCatalog>,
        identity: Option<Arc<dyn Identity>>,
    ) -> Self {
        Self {
            resource: R::NAME,
            registry: R::possible_errors(),
            catalog,
            identity,
            response: None,
            errors: Vec::new(),
        }
    }

    pub fn resource(&self) -> &'static str {
        self.resource
    }

    pub fn identity(&self) -> Option<&dyn Identity> {
        self.identity.as_deref()
    }

    /// The caller identity, or access denied when there is none.
    pub fn require_identity(&self) -> ResourceResult<&dyn Identity> {
        self.identity.as_deref().ok_or_else(|| {
            ResourceError::AccessDenied(Some("authentication required".to_string()))
        })
    }

    pub fn catalog(&self) -> &EntityCatalog {
        &self.catalog
    }

    // --- Errors ---

    pub fn get_error(
        &self,
        code: &str,
        overrides: Value,
    ) -> Result<ValidationError, InternalError> {
        self.registry.get_error(code, overrides)
    }

    /// Fails with a validation failure. Never returns `Ok`.
    ///
    /// `params` only applies when `source` is an error code. Prebuilt errors
    /// must carry a code of this resource's registry.
    pub fn error<T>(&self, source: impl Into<ErrorSource>, params: Value) -> ResourceResult<T> {
        let failure = match source.into() {
            ErrorSource::Code(code) => ValidationFailure::single(self.get_error(&code, params)?),
            ErrorSource::Error(error) => ValidationFailure::single(self.owned(error)?),
            ErrorSource::Errors(errors) => ValidationFailure::from_errors(
                errors
                    .into_iter()
                    .map(|error| self.owned(error))
                    .collect::<Result<_, _>>()?,
            )?,
        };
        debug!(resource = self.resource, errors = %failure, "Validation failed");
        Err(failure.into())
    }

    fn owned(&self, error: ValidationError) -> Result<ValidationError, InternalError> {
        if self.registry.contains(error.code()) {
            Ok(error)
        } else {
            Err(InternalError::UnknownErrorCode {
                resource: self.resource,
                code: error.code().to_string(),
            })
        }
    }

    /// Stages an error without failing.
    pub fn add_error(&mut self, code: &str, params: Value) -> Result<(), InternalError> {
        let error = self.get_error(code, params)?;
        self.errors.push(error);
        Ok(())
    }

    pub fn staged_errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Fails with every staged error, in the order they were added.
    pub fn fail_with_staged<T>(&mut self) -> ResourceResult<T> {
        let errors = std::mem::take(&mut self.errors);
        self.error(errors, Value::Null)
    }

    /// Fails with the staged errors if there are any.
    pub fn check_errors(&mut self) -> ResourceResult<()> {
        if self.errors.is_empty() {
            return Ok(());
        }
        self.fail_with_staged()
    }

    pub fn access_denied<T>(&self, message: Option<&str>) -> ResourceResult<T> {
        debug!(resource = self.resource, message, "Access denied");
        Err(ResourceError::AccessDenied(message.map(str::to_string)))
    }

    pub fn not_found<T>(&self, message: Option<&str>) -> ResourceResult<T> {
        debug!(resource = self.resource, message, "Not found");
        Err(ResourceError::NotFound(message.map(str::to_string)))
    }

    // --- Output ---

    /// Records the value to serialize. A later call replaces an earlier one.
    pub fn output<T: Serialize>(&mut self, value: T) -> Result<(), InternalError> {
        let value =
            serde_json::to_value(value).map_err(|e| InternalError::Serialization(e.to_string()))?;
        self.response.get_or_insert_with(Response::new).set_output(value);
        Ok(())
    }

    pub fn response(&self) -> Option<&Response> {
        self.response.as_ref()
    }

    pub fn take_response(&mut self) -> Option<Response> {
        self.response.take()
    }

    // --- References ---

    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.catalog)
    }

    /// Resolves `value` to `kind`, failing with `error_code` if the entity
    /// layer rejects it. Unknown entity types stay internal errors.
    pub fn resolve<E: Entity>(
        &self,
        kind: ReferenceKind,
        value: Reference<E>,
        error_code: &str,
    ) -> ResourceResult<Reference<E>> {
        let result = self.resolver().resolve(kind, value);
        self.translate::<E, _>(result, error_code)
    }

    pub fn convert_to_id<E: Entity>(
        &self,
        value: Reference<E>,
        error_code: &str,
    ) -> ResourceResult<EntityId> {
        let result = self.resolver().convert_to_id(value);
        self.translate::<E, _>(result, error_code)
    }

    pub fn convert_to_ide<E: Entity>(
        &self,
        value: Reference<E>,
        error_code: &str,
    ) -> ResourceResult<String> {
        let result = self.resolver().convert_to_ide(value);
        self.translate::<E, _>(result, error_code)
    }

    pub fn convert_to_object<E: Entity>(
        &self,
        value: Reference<E>,
        error_code: &str,
    ) -> ResourceResult<E> {
        let result = self.resolver().convert_to_object(value);
        self.translate::<E, _>(result, error_code)
    }

    // The entity-layer cause is logged and dropped; callers only see `error_code`.
    fn translate<E: Entity, T>(
        &self,
        result: Result<T, ResolveError>,
        error_code: &str,
    ) -> ResourceResult<T> {
        match result {
            Ok(value) => Ok(value),
            Err(ResolveError::Internal(e)) => Err(e.into()),
            Err(ResolveError::Entity(cause)) => {
                debug!(
                    resource = self.resource,
                    entity_type = E::TYPE_NAME,
                    code = error_code,
                    error = %cause,
                    "Reference rejected"
                );
                self.error(error_code, Value::Null)
            }
        }
    }
}

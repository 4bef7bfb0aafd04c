//! # Framework Errors
//!
//! Every failure a resource can produce is one of the [`ResourceError`] variants.
//! The router selects a transport status from the variant, so the kinds must stay
//! distinguishable:
//!
//! - [`ResourceError::Validation`]: input the caller can correct, one or more coded errors.
//! - [`ResourceError::AccessDenied`]: the caller lacks permission.
//! - [`ResourceError::NotFound`]: the referenced record does not exist.
//! - [`ResourceError::Routing`]: the requested action is not registered.
//! - [`ResourceError::Internal`]: a defect in a resource type's own definitions.
//!
//! [`EntityError`] belongs to the entity layer and never crosses the resolver boundary.

use crate::validation::ValidationFailure;
use http::StatusCode;
use serde_json::{json, Value};

/// Result type returned by resource constructors and action methods.
pub type ResourceResult<T> = Result<T, ResourceError>;

/// Programmer errors: a misconfigured resource type, never bad user input.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum InternalError {
    #[error("unknown error code `{code}` for resource {resource}")]
    UnknownErrorCode { resource: &'static str, code: String },

    #[error("error definition `{code}` for resource {resource} is not a mapping")]
    MalformedErrorDefinition { resource: &'static str, code: String },

    #[error("error registry for resource {0} is not a mapping")]
    MalformedRegistry(&'static str),

    #[error("parameters for error `{0}` are not a mapping")]
    MalformedErrorParams(String),

    #[error("validation failure raised without any errors")]
    EmptyValidationFailure,

    #[error("unknown entity type: {0}")]
    UnknownEntityType(String),

    #[error("entity type {0} is registered with a repository of another type")]
    EntityTypeMismatch(&'static str),

    #[error("unsupported conversion: {0}")]
    UnsupportedConversion(String),

    #[error("resource {resource} has no method `{method}`")]
    UnknownMethod { resource: &'static str, method: String },

    #[error("failed to serialize output: {0}")]
    Serialization(String),
}

/// Lookup failures the router answers with a routing error.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum RoutingError {
    #[error("resource {resource} has no action `{action}`")]
    UnknownAction { resource: &'static str, action: String },
}

/// Failures raised by entity repositories while converting references.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum EntityError {
    #[error("{entity_type} {reference} not found")]
    NotFound {
        entity_type: &'static str,
        reference: String,
    },

    #[error("invalid {entity_type} reference: {reason}")]
    InvalidReference {
        entity_type: &'static str,
        reason: String,
    },

    #[error("{entity_type} storage error: {message}")]
    Storage {
        entity_type: &'static str,
        message: String,
    },
}

/// The failure kinds a resource hands back to the router.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum ResourceError {
    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    #[error("access denied{}", detail(.0))]
    AccessDenied(Option<String>),

    #[error("not found{}", detail(.0))]
    NotFound(Option<String>),

    #[error(transparent)]
    Routing(#[from] RoutingError),

    #[error("internal error: {0}")]
    Internal(#[from] InternalError),
}

fn detail(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {m}"))
        .unwrap_or_default()
}

impl ResourceError {
    /// Short machine-readable name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ResourceError::Validation(_) => "validation_failed",
            ResourceError::AccessDenied(_) => "access_denied",
            ResourceError::NotFound(_) => "not_found",
            ResourceError::Routing(_) => "unknown_action",
            ResourceError::Internal(_) => "internal_error",
        }
    }

    /// Transport status for this failure kind.
    pub fn status(&self) -> StatusCode {
        match self {
            ResourceError::Validation(_) => StatusCode::BAD_REQUEST,
            ResourceError::AccessDenied(_) => StatusCode::FORBIDDEN,
            ResourceError::NotFound(_) | ResourceError::Routing(_) => StatusCode::NOT_FOUND,
            ResourceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, ResourceError::Internal(_))
    }

    /// Renders the JSON body sent to the client.
    ///
    /// Internal faults only carry their detail when `expose_internal` is set;
    /// otherwise the client sees a generic message.
    pub fn to_body(&self, expose_internal: bool) -> Value {
        match self {
            ResourceError::Validation(failure) => json!({
                "error": self.kind(),
                "errors": failure.errors(),
            }),
            ResourceError::AccessDenied(message) | ResourceError::NotFound(message) => json!({
                "error": self.kind(),
                "message": message,
            }),
            ResourceError::Routing(e) => json!({
                "error": self.kind(),
                "message": e.to_string(),
            }),
            ResourceError::Internal(e) => {
                let message = if expose_internal {
                    e.to_string()
                } else {
                    "Internal server error".to_string()
                };
                json!({ "error": self.kind(), "message": message })
            }
        }
    }
}

//! # Validation Errors
//!
//! A resource type declares the vocabulary of validation errors it can report in
//! an [`ErrorRegistry`]: a mapping from error code to default attributes
//! (`message`, `fields`, `type`, plus any domain keys).
//!
//! [`ValidationError`]s are only built through the registry, so every error in
//! flight carries a code its resource type actually declared. Callers may
//! override individual attributes; the merge is shallow and overrides win.
//!
//! A [`ValidationFailure`] carries one or more errors out of a resource and is
//! never empty.

use crate::error::InternalError;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

/// One coded validation error with its merged attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    code: String,
    attributes: Map<String, Value>,
}

impl ValidationError {
    pub(crate) fn new(code: impl Into<String>, attributes: Map<String, Value>) -> Self {
        Self {
            code: code.into(),
            attributes,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn message(&self) -> Option<&str> {
        self.attributes.get("message").and_then(Value::as_str)
    }

    /// Field names the error applies to; non-string entries are skipped.
    pub fn fields(&self) -> Vec<&str> {
        match self.attributes.get("fields") {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            Some(Value::String(single)) => vec![single.as_str()],
            _ => Vec::new(),
        }
    }

    /// The optional `type` classifier.
    pub fn kind(&self) -> Option<&str> {
        self.attributes.get("type").and_then(Value::as_str)
    }
}

// `code` is written first and an attribute named `code` never shadows it.
impl Serialize for ValidationError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let extra = self.attributes.keys().filter(|k| *k != "code").count();
        let mut map = serializer.serialize_map(Some(extra + 1))?;
        map.serialize_entry("code", &self.code)?;
        for (key, value) in self.attributes.iter().filter(|(k, _)| *k != "code") {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Aggregate failure carrying one or more validation errors, in order.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
#[error("validation failed: {}", codes(.errors))]
pub struct ValidationFailure {
    errors: Vec<ValidationError>,
}

fn codes(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ValidationError::code)
        .collect::<Vec<_>>()
        .join(", ")
}

impl ValidationFailure {
    pub fn single(error: ValidationError) -> Self {
        Self {
            errors: vec![error],
        }
    }

    /// Builds a failure from a list of errors; an empty list is a defect.
    pub fn from_errors(errors: Vec<ValidationError>) -> Result<Self, InternalError> {
        if errors.is_empty() {
            return Err(InternalError::EmptyValidationFailure);
        }
        Ok(Self { errors })
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    // Never true for a constructed failure.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.errors.iter().any(|e| e.code == code)
    }
}

/// What a resource may raise as a validation failure.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorSource {
    /// A registry code, resolved with the accompanying parameters.
    Code(String),
    Error(ValidationError),
    Errors(Vec<ValidationError>),
}

impl From<&str> for ErrorSource {
    fn from(code: &str) -> Self {
        ErrorSource::Code(code.to_string())
    }
}

impl From<String> for ErrorSource {
    fn from(code: String) -> Self {
        ErrorSource::Code(code)
    }
}

impl From<ValidationError> for ErrorSource {
    fn from(error: ValidationError) -> Self {
        ErrorSource::Error(error)
    }
}

impl From<Vec<ValidationError>> for ErrorSource {
    fn from(errors: Vec<ValidationError>) -> Self {
        ErrorSource::Errors(errors)
    }
}

/// Per-resource-type mapping from error code to default attributes.
///
/// Definitions are kept as a JSON value so registries can be written with
/// `serde_json::json!`; the shape is checked on lookup.
#[derive(Debug, Clone)]
pub struct ErrorRegistry {
    resource: &'static str,
    definitions: Value,
}

impl ErrorRegistry {
    pub fn new(resource: &'static str, definitions: Value) -> Self {
        Self {
            resource,
            definitions,
        }
    }

    pub fn resource(&self) -> &'static str {
        self.resource
    }

    pub fn contains(&self, code: &str) -> bool {
        self.definitions
            .as_object()
            .is_some_and(|defs| defs.contains_key(code))
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.definitions
            .as_object()
            .into_iter()
            .flat_map(|defs| defs.keys().map(String::as_str))
    }

    /// Resolves `code` to an error, merging `overrides` over the registered defaults.
    ///
    /// `overrides` must be a JSON object or `null`.
    pub fn get_error(
        &self,
        code: &str,
        overrides: Value,
    ) -> Result<ValidationError, InternalError> {
        let definitions = self
            .definitions
            .as_object()
            .ok_or(InternalError::MalformedRegistry(self.resource))?;

        let defaults = definitions
            .get(code)
            .ok_or_else(|| InternalError::UnknownErrorCode {
                resource: self.resource,
                code: code.to_string(),
            })?
            .as_object()
            .ok_or_else(|| InternalError::MalformedErrorDefinition {
                resource: self.resource,
                code: code.to_string(),
            })?;

        let mut attributes = defaults.clone();
        match overrides {
            Value::Null => {}
            Value::Object(overrides) => attributes.extend(overrides),
            _ => return Err(InternalError::MalformedErrorParams(code.to_string())),
        }

        Ok(ValidationError::new(code, attributes))
    }
}

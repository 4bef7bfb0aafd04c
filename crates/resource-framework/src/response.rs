//! Response accumulator and caller identity.

use serde_json::{Map, Value};
use std::fmt::Debug;

/// The authenticated caller a resource authorizes against.
///
/// Opaque to the framework; concrete resources query it.
pub trait Identity: Debug + Send + Sync {
    fn subject(&self) -> &str;

    fn has_role(&self, role: &str) -> bool;
}

/// Output accumulator for one resource invocation. The last output recorded wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    output: Option<Value>,
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_output(&mut self, value: Value) {
        self.output = Some(value);
    }

    pub fn output(&self) -> Option<&Value> {
        self.output.as_ref()
    }

    pub fn into_output(self) -> Option<Value> {
        self.output
    }

    /// The serialized body, wrapped under `wrapper` when one is given.
    /// A response without output serializes as `null`.
    pub fn into_body(self, wrapper: Option<&str>) -> Value {
        let output = self.output.unwrap_or(Value::Null);
        match wrapper {
            Some(key) => {
                let mut wrapped = Map::new();
                wrapped.insert(key.to_string(), output);
                Value::Object(wrapped)
            }
            None => output,
        }
    }
}

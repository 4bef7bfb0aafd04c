//! # Action Registry
//!
//! Each resource type publishes the actions a router may invoke on it. An
//! [`ActionDescriptor`] records only what the resource type chose to set; the
//! defaults are applied by [`ActionDescriptor::resolve`]:
//!
//! - **method**: lower camel case of the action name (`update_email` -> `updateEmail`)
//! - **status**: `200 OK`
//! - **wrapper**: the action name; an empty wrapper means the output is not wrapped
//!
//! ```
//! use resource_framework::{ActionDescriptor, ActionRegistry};
//! use http::StatusCode;
//!
//! let actions = ActionRegistry::new("User")
//!     .action("get", ActionDescriptor::new().wrapper("user"))
//!     .action("create", ActionDescriptor::new().status(StatusCode::CREATED))
//!     .action("update_email", ActionDescriptor::new().wrapper(""));
//!
//! let update = actions.resolve("update_email").unwrap();
//! assert_eq!(update.method, "updateEmail");
//! assert_eq!(update.status, StatusCode::OK);
//! assert_eq!(update.wrapper, None);
//!
//! assert!(actions.get_action("delete").is_err());
//! ```

use crate::error::RoutingError;
use heck::ToLowerCamelCase;
use http::StatusCode;
use std::collections::BTreeMap;

/// Metadata for one externally invocable action, as declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActionDescriptor {
    pub method: Option<&'static str>,
    pub status: Option<StatusCode>,
    pub wrapper: Option<&'static str>,
}

impl ActionDescriptor {
    pub const fn new() -> Self {
        Self {
            method: None,
            status: None,
            wrapper: None,
        }
    }

    pub const fn method(mut self, method: &'static str) -> Self {
        self.method = Some(method);
        self
    }

    pub const fn status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    pub const fn wrapper(mut self, wrapper: &'static str) -> Self {
        self.wrapper = Some(wrapper);
        self
    }

    /// Applies the defaults for every unset field.
    pub fn resolve(&self, name: &str) -> ResolvedAction {
        let method = self
            .method
            .map(str::to_string)
            .unwrap_or_else(|| name.to_lower_camel_case());
        let wrapper = match self.wrapper {
            Some("") => None,
            Some(key) => Some(key.to_string()),
            None => Some(name.to_string()),
        };

        ResolvedAction {
            name: name.to_string(),
            method,
            status: self.status.unwrap_or(StatusCode::OK),
            wrapper,
        }
    }
}

/// An action with all defaults applied, ready for the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAction {
    pub name: String,
    pub method: String,
    pub status: StatusCode,
    pub wrapper: Option<String>,
}

/// Action name to descriptor, built once per resource type.
#[derive(Debug, Clone)]
pub struct ActionRegistry {
    resource: &'static str,
    actions: BTreeMap<&'static str, ActionDescriptor>,
}

impl ActionRegistry {
    pub fn new(resource: &'static str) -> Self {
        Self {
            resource,
            actions: BTreeMap::new(),
        }
    }

    pub fn action(mut self, name: &'static str, descriptor: ActionDescriptor) -> Self {
        self.actions.insert(name, descriptor);
        self
    }

    pub fn resource(&self) -> &'static str {
        self.resource
    }

    /// Pure lookup; no defaults are applied.
    pub fn get_action(&self, name: &str) -> Result<&ActionDescriptor, RoutingError> {
        self.actions
            .get(name)
            .ok_or_else(|| RoutingError::UnknownAction {
                resource: self.resource,
                action: name.to_string(),
            })
    }

    pub fn resolve(&self, name: &str) -> Result<ResolvedAction, RoutingError> {
        self.get_action(name).map(|descriptor| descriptor.resolve(name))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.actions.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

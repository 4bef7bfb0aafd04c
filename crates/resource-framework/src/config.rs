//! Dispatcher configuration.
//!
//! | Variable | Default | Effect |
//! |----------|---------|--------|
//! | `RESOURCE_WRAP_RESPONSES` | `true` | Wrap output under the action's wrapper key |
//! | `RESOURCE_EXPOSE_INTERNAL_ERRORS` | `false` | Include internal fault detail in error bodies |

use std::env;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?} (expected true/false)")]
    InvalidFlag { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchConfig {
    pub wrap_responses: bool,
    pub expose_internal_errors: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            wrap_responses: true,
            expose_internal_errors: false,
        }
    }
}

impl DispatchConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads settings through `lookup`; unset variables keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            wrap_responses: flag(&lookup, "RESOURCE_WRAP_RESPONSES", defaults.wrap_responses)?,
            expose_internal_errors: flag(
                &lookup,
                "RESOURCE_EXPOSE_INTERNAL_ERRORS",
                defaults.expose_internal_errors,
            )?,
        })
    }
}

fn flag(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: bool,
) -> Result<bool, ConfigError> {
    let Some(raw) = lookup(name) else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        "" => Ok(default),
        _ => Err(ConfigError::InvalidFlag { name, value: raw }),
    }
}

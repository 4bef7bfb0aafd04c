use http::StatusCode;
use resource_framework::ConfigError;
use serde_json::Value;

/// Failures surfaced by the sample application.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{resource}.{action} answered {status}: {body}")]
    Rejected {
        resource: &'static str,
        action: String,
        status: StatusCode,
        body: Value,
    },

    #[error("dispatch task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

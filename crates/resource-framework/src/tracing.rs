//! # Observability & Tracing
//!
//! Structured logging for the resource framework, built on `tracing`.
//!
//! ## What Gets Traced
//!
//! - **Dispatch**: one `dispatch` span per invocation with `resource` and `action` fields
//! - **Outcomes**: `Action ok` with the status, or `Action rejected` / `Action failed`
//!   with the error kind
//! - **Validation**: the codes of every failure raised through a resource context
//! - **References**: entity-layer causes that were replaced by a validation error,
//!   logged at `debug` so they stay diagnosable without reaching the client
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run -p resource-sample
//! RUST_LOG=resource_framework=debug cargo run -p resource-sample
//! ```

/// Installs a compact `fmt` subscriber filtered by `RUST_LOG`.
///
/// Only the first call installs anything; later calls are no-ops.
pub fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .try_init();
}

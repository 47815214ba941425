//! Structured logging using **tracing**.
//!
//! Events go to stderr as JSON so standard output stays free for generated
//! source when the output destination is `-`.

use tracing::{debug, warn};

use crate::error::{EnumstrError, Stage};

/// Initializes the global tracing collector (subscriber).
///
/// Call once at the start of the process.
///
/// # Environment Variables
/// - `RUST_LOG`: Controls log filtering (e.g., `RUST_LOG=enumstr_core=debug`)
pub fn init_structured_logging() {
    tracing_subscriber::fmt()
        .json()
        .with_ansi(false)
        .with_level(true)
        .with_target(true)
        .with_current_span(true)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

/// Logs a requested type that matched no constants.
pub fn log_unsatisfied(type_name: &str) {
    warn!(event = "unsatisfied_type", type_name = %type_name);
}

/// Records a fatal pipeline failure. The error itself is returned to the
/// caller, which reports it once.
pub fn log_failure(stage: Stage, err: &EnumstrError) {
    debug!(event = "run_failed", stage = %stage, detail = %err);
}

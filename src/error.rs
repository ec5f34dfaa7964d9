//! Error types for the DiffBot hardware layer.
//!
//! Fatal configuration errors abort the current lifecycle transition and
//! surface synchronously to the caller. Per-cycle actuation failures are
//! handled inside `read`/`write` and never reach this type.

use crate::daemon::DaemonError;
use crate::joint::ContractViolation;
use thiserror::Error;

/// Error types for hardware layer operations.
#[derive(Debug, Clone, Error)]
pub enum HalError {
    /// Configuration error (missing or malformed parameters)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Joint interface contract violated
    #[error("Joint contract violated: {}", summarize(.0))]
    Contract(Vec<ContractViolation>),

    /// GPIO daemon operation failed
    #[error("GPIO daemon error: {0}")]
    Daemon(#[from] DaemonError),

    /// Lifecycle method called from the wrong state
    #[error("Invalid lifecycle transition: {0}")]
    InvalidTransition(String),
}

/// Join all contract violations into a single diagnostic line.
fn summarize(violations: &[ContractViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

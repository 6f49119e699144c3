//! Error types for the glesbed core.

use thiserror::Error;

/// Errors produced by the core machinery.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A required GL entry point could not be resolved by name.
    #[error("could not resolve GL entry point '{0}'")]
    MissingProc(String),

    /// A GL operation was submitted after the backend context shut down.
    #[error("backend context is shut down")]
    ContextShutDown,
}

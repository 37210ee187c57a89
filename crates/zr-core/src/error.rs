//! Crate-wide error type for `zr-core`.
//!
//! Mirrors the error kinds enumerated in the top-level error handling design:
//! `TaskNotFound`, `CycleDetected`, `ConfigurationInvalid` surface here; the
//! remaining kinds (`SpawnFailed`, `Timeout`, ...) live in the crates that own
//! the behavior they describe.

use std::path::PathBuf;

/// Result alias used throughout `zr-core`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while building or validating the shared data model.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A task referenced by name (as a dependency, a target, or a stage member)
    /// is not declared in the configuration.
    #[error("task not found: {name}")]
    TaskNotFound {
        /// The undeclared task name.
        name: String,
    },

    /// The task or workspace member graph contains a cycle.
    #[error("dependency cycle detected: {}", path.join(" -> "))]
    CycleDetected {
        /// The cycle, starting and ending at the same name.
        path: Vec<String>,
    },

    /// A configuration constraint was violated.
    #[error("invalid configuration: {reason}")]
    ConfigurationInvalid {
        /// Human-readable description of the violated constraint.
        reason: String,
    },

    /// A condition expression failed to parse or evaluate.
    #[error("invalid condition expression {expr:?}: {reason}")]
    InvalidCondition {
        /// The offending expression source.
        expr: String,
        /// Why it could not be evaluated.
        reason: String,
    },

    /// An I/O operation failed while resolving a path.
    #[error("io error during {operation} on {path}: {source}")]
    Io {
        /// What was being attempted (`"canonicalize"`, `"read"`, ...).
        operation: &'static str,
        /// The path involved.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Builds a [`Error::ConfigurationInvalid`] from any displayable reason.
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::ConfigurationInvalid {
            reason: reason.into(),
        }
    }
}

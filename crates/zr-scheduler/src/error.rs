//! Crate-wide error type for `zr-scheduler`.
//!
//! Only failures that abort a run *before any task starts* live here (spec
//! §7: "cycles and configuration errors abort the run before any task
//! starts"). Per-task failures (a command exiting non-zero, a timeout) are
//! never an `Error` — they are recorded in that task's
//! [`crate::TaskResult`] and the run continues.

/// Result alias used throughout `zr-scheduler`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can abort a run before dispatch begins (spec §7).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A target, or a dependency reachable from one, does not resolve to a
    /// declared task.
    #[error("task not found: {name}")]
    TaskNotFound {
        /// The undeclared task name.
        name: String,
    },

    /// The reachable sub-DAG for the requested targets contains a cycle.
    #[error("dependency cycle detected: {}", path.join(" -> "))]
    CycleDetected {
        /// The cycle, starting and ending at the same task name.
        path: Vec<String>,
    },

    /// A task's `condition` expression could not be parsed or evaluated.
    #[error("invalid condition on task {task}: {source}")]
    InvalidCondition {
        /// The task whose condition failed to evaluate.
        task: String,
        /// The underlying evaluation error.
        #[source]
        source: zr_core::Error,
    },
}

impl From<zr_dag::Error> for Error {
    fn from(source: zr_dag::Error) -> Self {
        match source {
            zr_dag::Error::MissingDependency { dependency, .. } => {
                Self::TaskNotFound { name: dependency }
            }
            zr_dag::Error::MissingDependencies { missing } => Self::TaskNotFound {
                name: missing
                    .into_iter()
                    .next()
                    .map_or_else(String::new, |(_, dep)| dep),
            },
            zr_dag::Error::CycleDetected { message } => Self::CycleDetected {
                path: vec![message],
            },
            zr_dag::Error::TopologicalSortFailed { reason } => Self::CycleDetected {
                path: vec![reason],
            },
        }
    }
}

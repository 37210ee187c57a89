//! Errors for the process supervisor.

use std::path::PathBuf;

/// Result alias for `zr-process`.
pub type Result<T> = std::result::Result<T, Error>;

/// `SpawnFailed` (and its close relatives) from the top-level error taxonomy
/// (spec §7).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The child process could not be started at all: no such program,
    /// permission denied, or the working directory is missing (spec §4.D,
    /// Failure modes).
    #[error("failed to spawn {command:?} in {working_dir}: {source}")]
    SpawnFailed {
        /// The command string that failed to spawn.
        command: String,
        /// The working directory it was spawned in.
        working_dir: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Waiting on, signaling, or reading from an already-spawned child failed.
    #[error("process I/O error during {operation}: {source}")]
    Io {
        /// What was being attempted.
        operation: &'static str,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

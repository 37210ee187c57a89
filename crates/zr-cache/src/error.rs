//! Errors for the cache store.

use std::path::PathBuf;

/// Result alias for `zr-cache`.
pub type Result<T> = std::result::Result<T, Error>;

/// `CacheIOFailure` from the top-level error taxonomy (spec §7).
///
/// Per spec §7's propagation rules, callers are expected to degrade
/// gracefully on these: a write failure means "return the result uncached",
/// a read failure means "treat the entry as a miss". The error type exists so
/// callers can log the distinction; it is not meant to abort a run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading or writing a cache record failed.
    #[error("cache {operation} failed for {path}: {source}")]
    Io {
        /// What was being attempted.
        operation: &'static str,
        /// The path involved.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A committed record could not be (de)serialized.
    #[error("cache record at {path} is corrupt: {source}")]
    Corrupt {
        /// The record path.
        path: PathBuf,
        /// The underlying serialization error.
        #[source]
        source: serde_json::Error,
    },

    /// No writable cache directory could be resolved.
    #[error("no writable cache directory available (tried {tried})")]
    NoCacheDirectory {
        /// The path(s) that were attempted.
        tried: String,
    },
}

//! Errors for the fingerprinting subsystem.

use std::path::PathBuf;

/// Result alias for `zr-fingerprint`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while computing a fingerprint.
///
/// A missing input file is *not* an error (spec §4.A): it is folded into the
/// digest as a distinguished variant. These errors cover failures that make a
/// fingerprint impossible to compute at all, surfaced as
/// `FingerprintInputMissing`-adjacent I/O failures in the error taxonomy.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The task's working directory could not be canonicalized.
    #[error("cannot canonicalize working directory {path}: {source}")]
    WorkingDirectory {
        /// The offending path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Reading a declared input's content failed for a reason other than
    /// "does not exist" (e.g. permission denied).
    #[error("failed to read input {path}: {source}")]
    ReadInput {
        /// The offending path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

//! Errors for the filesystem watcher.

use std::path::PathBuf;

/// Result alias for `zr-watcher`.
pub type Result<T> = std::result::Result<T, Error>;

/// `WatcherFailure` from the top-level error taxonomy (spec §7).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The native backend could not be initialized or could not watch one
    /// of the requested paths.
    #[error("failed to watch {path}: {source}")]
    WatchFailed {
        /// The path that could not be watched.
        path: PathBuf,
        /// The underlying `notify` error.
        #[source]
        source: notify::Error,
    },

    /// A path declared to `init` does not exist.
    #[error("watch path does not exist: {path}")]
    PathNotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// The channel feeding events from the native backend's callback closed
    /// unexpectedly (the backend thread died).
    #[error("watcher event channel closed")]
    ChannelClosed,
}

//! Errors for affected-member detection.

/// Result alias for `zr-affected`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors arising while computing the affected member set (spec §4.G).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The repository at `repo_root` could not be opened.
    #[error("failed to open git repository: {source}")]
    RepoOpenFailed {
        /// The underlying gix error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// `base_ref` or `HEAD` did not resolve to a commit.
    #[error("failed to resolve revision {reference:?}: {source}")]
    RevisionResolutionFailed {
        /// The reference that failed to resolve.
        reference: String,
        /// The underlying gix error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// No common ancestor exists between `base_ref` and `HEAD`.
    #[error("no merge base between {base_ref:?} and HEAD: {source}")]
    MergeBaseFailed {
        /// The reference that had no merge base with `HEAD`.
        base_ref: String,
        /// The underlying gix error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// A commit or its tree could not be looked up.
    #[error("failed to read tree for commit {commit}: {source}")]
    TreeLookupFailed {
        /// The commit whose tree could not be read.
        commit: String,
        /// The underlying gix error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// Diffing the two trees failed.
    #[error("failed to diff trees: {source}")]
    DiffFailed {
        /// The underlying gix error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

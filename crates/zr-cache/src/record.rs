//! The on-disk shape of a cache entry (spec §4.C, §6, §9 Open Question #2).
//!
//! One flat file per fingerprint: `cache/<ab>/<fingerprint>`. Deliberately
//! simpler than `cuenv-core`'s directory-per-entry CAS layout
//! (`cache/tasks.rs`) since spec §6 names a single file path, not a
//! directory of blobs.

use serde::{Deserialize, Serialize};

/// A committed cache record: everything replaying a task's prior result
/// needs.
///
/// Per spec §9's Open Question #2 ("whether cache entries should include
/// captured stdout/stderr"), this implementation includes them for replay,
/// matching the spec's stated default; `omit_output` lets a caller opt a
/// particular commit out when the bytes are known to be large.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRecord {
    /// The process exit code of the build that produced this record.
    pub exit_code: i32,
    /// Captured standard output, if retained (see `omit_output`).
    #[serde(default)]
    pub stdout: String,
    /// Captured standard error, if retained.
    #[serde(default)]
    pub stderr: String,
    /// Wall-clock duration of the original (non-cached) run.
    pub duration_ms: u64,
}

impl CacheRecord {
    /// A record with output bytes stripped, for callers that opt out of
    /// persisting potentially-large captured output (spec §9).
    #[must_use]
    pub fn without_output(mut self) -> Self {
        self.stdout.clear();
        self.stderr.clear();
        self
    }
}

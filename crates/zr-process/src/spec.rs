//! The process supervisor's input contract (spec §4.D): `run(spec) -> result`.

use std::path::PathBuf;

use crate::cancellation::CancellationHandle;
use crate::output::OutputSender;

/// Everything the supervisor needs to spawn, stream, and bound one command.
pub struct ProcessSpec {
    /// The task name, attached to every [`crate::OutputLine`] and event this
    /// run emits.
    pub task_name: String,
    /// The shell-interpreted command string to execute.
    pub command: String,
    /// The resolved working directory. Must already exist; a missing
    /// directory surfaces as [`crate::Error::SpawnFailed`].
    pub working_dir: PathBuf,
    /// Environment overlay, already merged over the inherited environment by
    /// the caller (`zr_core::env::merge`).
    pub environment: Vec<(String, String)>,
    /// `0` disables the timeout.
    pub timeout_ms: u64,
    /// Best-effort memory ceiling; advisory where the platform cannot
    /// enforce it (spec §4.D).
    pub max_memory_bytes: Option<u64>,
    /// Best-effort CPU ceiling; always advisory (spec §9 Open Question #3 —
    /// no POSIX syscall throttles CPU *percentage* directly, only CPU time).
    pub max_cpu_percent: Option<u32>,
    /// Where completed output lines are delivered.
    pub output_sink: OutputSender,
    /// Observed for timeout-independent cancellation (Ctrl-C, fail-fast,
    /// external control).
    pub cancellation_handle: CancellationHandle,
}

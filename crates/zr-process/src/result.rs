//! The process supervisor's output contract (spec §4.D).

/// Whether a declared resource ceiling was actually enforced by the
/// platform, or merely recorded (spec §4.D, §9 Open Question #3: "Treat as
/// advisory where OS support is absent, with a clear capability report in
/// the run metadata").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResourceEnforcement {
    /// `true` if `max_memory_bytes` was applied via a platform facility
    /// (POSIX `RLIMIT_AS`); `false` if it was only recorded.
    pub memory_enforced: bool,
    /// `true` if `max_cpu_percent` was applied via a platform facility.
    /// Always `false` today: see [`crate::ProcessSpec::max_cpu_percent`].
    pub cpu_enforced: bool,
}

/// The outcome of one supervised process run (spec §4.D).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessResult {
    /// The process's exit code, or `None` if it was killed by a signal
    /// rather than exiting normally.
    pub exit_code: Option<i32>,
    /// `true` iff the process exited with code 0 and was not signaled,
    /// timed out, or cancelled.
    pub success: bool,
    /// `true` if the run was terminated for exceeding `timeout_ms`.
    pub timed_out: bool,
    /// `true` if the run was terminated via the cancellation handle.
    pub cancelled: bool,
    /// Wall-clock duration of the run.
    pub duration_ms: u64,
    /// Which declared resource ceilings were actually enforced.
    pub resource_enforcement: ResourceEnforcement,
}

impl ProcessResult {
    pub(crate) fn new(
        exit_code: Option<i32>,
        timed_out: bool,
        cancelled: bool,
        duration_ms: u64,
        resource_enforcement: ResourceEnforcement,
    ) -> Self {
        let success = !timed_out && !cancelled && exit_code == Some(0);
        Self {
            exit_code,
            success,
            timed_out,
            cancelled,
            duration_ms,
            resource_enforcement,
        }
    }
}

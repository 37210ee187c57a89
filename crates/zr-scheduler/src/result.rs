//! The scheduler's output contract: one [`TaskResult`] per admitted or
//! skipped task, rolled up into a [`RunResult`] (spec §4.E, §6 "Machine-
//! readable output").

/// The terminal state a task reached (spec §4.E: "State machine per task").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// The command exited zero (or `allow_failure` masked a non-zero exit).
    Succeeded,
    /// The command exited non-zero and `allow_failure` was not set.
    Failed,
    /// The command exceeded `timeout_ms`.
    TimedOut,
    /// The run was cancelled (fail-fast or an external handle) while this
    /// task was in flight.
    Cancelled,
    /// The task's `condition` evaluated false.
    Skipped,
    /// A transitive, non-`allow_failure` dependency failed, so this task
    /// was never admitted.
    SkippedDueToDependencyFailure,
}

impl TaskStatus {
    /// Whether this status counts as successful for dependency-poisoning
    /// purposes (spec §3 invariants, §4.E step 2: "a skipped task counts as
    /// successful for poisoning purposes").
    #[must_use]
    pub fn poisons_dependents(self) -> bool {
        matches!(
            self,
            Self::Failed | Self::TimedOut | Self::Cancelled | Self::SkippedDueToDependencyFailure
        )
    }
}

/// One task's outcome within a run.
#[derive(Debug, Clone)]
pub struct TaskResult {
    /// The task name.
    pub name: String,
    /// The terminal state reached.
    pub status: TaskStatus,
    /// Whether this result should be treated as a run success: `true` for
    /// [`TaskStatus::Succeeded`] and [`TaskStatus::Skipped`], and also `true`
    /// for any other status when the task declared `allow_failure` (spec §9
    /// Open Question #1: `allow_failure` suppresses the task from the
    /// run's exit code).
    pub success: bool,
    /// The process exit code, when the task actually ran.
    pub exit_code: Option<i32>,
    /// Wall-clock duration of the (possibly cached) execution.
    pub duration_ms: u64,
    /// `true` if this result was served from the cache rather than spawned.
    pub from_cache: bool,
    /// How many retry attempts were consumed (0 for a first-try result).
    pub retries_used: u32,
}

impl TaskResult {
    #[must_use]
    pub(crate) fn skipped_due_to_dependency_failure(name: String) -> Self {
        Self {
            name,
            status: TaskStatus::SkippedDueToDependencyFailure,
            success: true,
            exit_code: None,
            duration_ms: 0,
            from_cache: false,
            retries_used: 0,
        }
    }

    #[must_use]
    pub(crate) fn condition_skipped(name: String) -> Self {
        Self {
            name,
            status: TaskStatus::Skipped,
            success: true,
            exit_code: None,
            duration_ms: 0,
            from_cache: false,
            retries_used: 0,
        }
    }
}

/// The overall outcome of a [`crate::run`] invocation.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// The conjunction of every non-`allow_failure` task's success (spec
    /// §4.E step 9).
    pub success: bool,
    /// Total wall-clock duration of the run.
    pub elapsed_ms: u64,
    /// Every task's result, including skipped ones.
    pub tasks: Vec<TaskResult>,
}

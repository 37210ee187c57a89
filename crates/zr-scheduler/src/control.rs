//! External control of an in-flight run (spec §4.E: "optional
//! `task_control_handle` (for external cancellation/pause/resume)").

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use zr_process::CancellationHandle;

/// A handle a caller can hold onto to steer a running [`crate::run`] from
/// outside the dispatch loop: cancel it outright (Ctrl-C), or pause new
/// admissions without touching already-running tasks.
///
/// Cloning shares the same underlying state; every clone observes the same
/// cancellation and pause state (spec §5: "a cancellation handle held by the
/// scheduler run fans out to per-task handles").
#[derive(Debug, Clone, Default)]
pub struct TaskControlHandle {
    cancellation: CancellationHandle,
    paused: Arc<AtomicBool>,
}

impl TaskControlHandle {
    /// Creates a fresh handle: not cancelled, not paused.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels the run. Already-running tasks are signaled to terminate;
    /// no further task is admitted (spec §5 "Cancellation").
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    /// True once [`Self::cancel`] has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Pauses admission of new tasks. Tasks already running are unaffected;
    /// they continue to completion.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    /// Resumes admission after a prior [`Self::pause`].
    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    /// True while admission of new tasks is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    pub(crate) fn process_cancellation(&self) -> CancellationHandle {
        self.cancellation.clone()
    }
}

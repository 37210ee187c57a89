//! `run(configuration, target_tasks, options)` options (spec §4.E).

use std::path::PathBuf;
use std::sync::Arc;

use zr_cache::CacheStore;
use zr_process::OutputSender;

use crate::control::TaskControlHandle;

/// Options governing one [`crate::run`] invocation.
#[derive(Debug, Clone)]
pub struct Options {
    /// Directory a task's relative `working_directory` is resolved against,
    /// and the default working directory for a task that declares none
    /// (spec §3). Typically the directory the configuration file was loaded
    /// from.
    pub config_dir: PathBuf,
    /// The cache a task with `cache_policy: Fingerprint` looks up and
    /// commits into (spec §4.C). `None` disables caching for the run even
    /// for tasks that request it, as if every task were `cache_policy: None`.
    pub cache_store: Option<Arc<CacheStore>>,
    /// Where captured task output lines are sent as they're produced (spec
    /// §4.D). `None` runs the tasks with their output captured but
    /// discarded immediately, since `zr-process` always requires a sink.
    pub output_sink: Option<OutputSender>,
    /// Cap on concurrent workers. `0` means one per hardware thread (spec
    /// §4.E: "`max_jobs` (cap on concurrent tasks; 0 means
    /// one-per-hardware-thread)").
    pub max_jobs: usize,
    /// When `true`, a task's output streams to the caller's own stdio
    /// rather than being captured via the output channel. This crate does
    /// not implement terminal rendering (spec §1 Non-goals); it only gates
    /// whether captured lines are still emitted through
    /// [`zr_events::emit_task_output`] for a collaborator to render.
    pub inherit_stdio: bool,
    /// Whether a collaborator intends to render captured output with
    /// color. Carried through unused by this crate (terminal rendering is
    /// out of scope, spec §1) so that `zr-events` renderers downstream can
    /// see it without a second parallel options type.
    pub use_color: bool,
    /// External cancellation/pause/resume control (spec §4.E).
    pub task_control_handle: Option<TaskControlHandle>,
    /// Whether the first non-`allow_failure` failure cancels every other
    /// running task and prevents further admission (spec §4.E step 8, §3:
    /// "[a Stage has] a per-stage `fail_fast` flag"). One `run` invocation
    /// corresponds to one workflow stage (or one ad-hoc target set), so
    /// `fail_fast` is carried here rather than as a separate parameter.
    pub fail_fast: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from("."),
            cache_store: None,
            output_sink: None,
            max_jobs: 0,
            inherit_stdio: false,
            use_color: false,
            task_control_handle: None,
            fail_fast: false,
        }
    }
}

impl Options {
    /// Options rooted at `config_dir`, with caching and output capture both
    /// disabled until a caller opts in.
    #[must_use]
    pub fn new(config_dir: PathBuf) -> Self {
        Self {
            config_dir,
            ..Self::default()
        }
    }

    /// Resolves `max_jobs` against the number of available hardware
    /// threads when it is `0`.
    #[must_use]
    pub(crate) fn effective_max_jobs(&self) -> usize {
        if self.max_jobs == 0 {
            std::thread::available_parallelism()
                .map(std::num::NonZeroUsize::get)
                .unwrap_or(1)
        } else {
            self.max_jobs
        }
    }
}

//! Runs one admitted task to completion, including its cache check and any
//! retries (spec §4.E steps 5 "Admission steps for a task T" and 6
//! "Retries").

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use zr_cache::{Admission, CacheRecord, CacheStore};
use zr_core::Task;
use zr_process::{CancellationHandle, OutputSender, ProcessSpec};

use crate::result::{TaskResult, TaskStatus};
use crate::retry;

/// Everything a worker needs that isn't already on the `Task` value itself.
pub(crate) struct WorkerContext {
    pub working_dir: PathBuf,
    pub environment: Vec<(String, String)>,
    pub cache_store: Option<Arc<CacheStore>>,
    pub output_sink: OutputSender,
    pub cancellation: CancellationHandle,
}

/// Runs `task` to completion: a cache lookup/reservation, then (on a miss)
/// the process supervisor, retrying on failure or timeout up to
/// `task.retry_max` times (spec §4.E step 6: "retries apply uniformly to
/// failure and timeout").
pub(crate) async fn run_task(task: &Task, ctx: &WorkerContext) -> TaskResult {
    if task.command.is_empty() {
        // Pure orchestration of dependencies (spec §3): nothing to run.
        return TaskResult {
            name: task.name.clone(),
            status: TaskStatus::Succeeded,
            success: true,
            exit_code: Some(0),
            duration_ms: 0,
            from_cache: false,
            retries_used: 0,
        };
    }

    if task.cache_policy == zr_core::CachePolicy::Fingerprint
        && let Some(store) = &ctx.cache_store
        && let Some(hit) = try_cache_hit(task, &ctx.working_dir, store).await
    {
        return hit;
    }

    let max_attempts = 1 + task.retry_max;
    let mut attempt = 1u32;
    loop {
        let result = run_once(task, ctx).await;
        let terminal = classify(task, &result, attempt - 1);

        let should_retry = matches!(
            terminal.status,
            TaskStatus::Failed | TaskStatus::TimedOut
        ) && attempt < max_attempts
            && !result.cancelled;

        if !should_retry {
            if terminal.success
                && task.cache_policy == zr_core::CachePolicy::Fingerprint
                && let Some(store) = &ctx.cache_store
            {
                commit_to_cache(task, &ctx.working_dir, store, &result).await;
            }
            return terminal;
        }

        let delay = retry::delay_for_attempt(
            task.retry_delay_ms,
            task.retry_exponential_backoff,
            attempt,
        );
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        attempt += 1;
    }
}

async fn run_once(task: &Task, ctx: &WorkerContext) -> zr_process::ProcessResult {
    let spec = ProcessSpec {
        task_name: task.name.clone(),
        command: task.command.clone(),
        working_dir: ctx.working_dir.clone(),
        environment: ctx.environment.clone(),
        timeout_ms: task.timeout_ms,
        max_memory_bytes: task.resource_limits.and_then(|l| l.max_memory_bytes),
        max_cpu_percent: task.resource_limits.and_then(|l| l.max_cpu_percent),
        output_sink: ctx.output_sink.clone(),
        cancellation_handle: ctx.cancellation.clone(),
    };
    match zr_process::run(spec).await {
        Ok(result) => result,
        Err(source) => {
            tracing::warn!(task = %task.name, error = %source, "failed to spawn task");
            zr_process::ProcessResult {
                exit_code: None,
                success: false,
                timed_out: false,
                cancelled: false,
                duration_ms: 0,
                resource_enforcement: zr_process::ResourceEnforcement::default(),
            }
        }
    }
}

fn classify(task: &Task, result: &zr_process::ProcessResult, retries_used: u32) -> TaskResult {
    let status = if result.cancelled {
        TaskStatus::Cancelled
    } else if result.timed_out {
        TaskStatus::TimedOut
    } else if result.success {
        TaskStatus::Succeeded
    } else {
        TaskStatus::Failed
    };
    let success = result.success || task.allow_failure;
    TaskResult {
        name: task.name.clone(),
        status,
        success,
        exit_code: result.exit_code,
        duration_ms: result.duration_ms,
        from_cache: false,
        retries_used,
    }
}

async fn try_cache_hit(task: &Task, working_dir: &Path, store: &CacheStore) -> Option<TaskResult> {
    let fingerprint = zr_fingerprint::fingerprint(task, working_dir)
        .map_err(|source| {
            tracing::warn!(task = %task.name, error = %source, "fingerprinting failed; running uncached");
        })
        .ok()?;
    match store.lookup(fingerprint).await {
        Some(record) => {
            zr_events::emit_task_cache_hit!(task.name, fingerprint.to_hex());
            Some(TaskResult {
                name: task.name.clone(),
                status: if record.exit_code == 0 || task.allow_failure {
                    TaskStatus::Succeeded
                } else {
                    TaskStatus::Failed
                },
                success: record.exit_code == 0 || task.allow_failure,
                exit_code: Some(record.exit_code),
                duration_ms: 0,
                from_cache: true,
                retries_used: 0,
            })
        }
        None => {
            zr_events::emit_task_cache_miss!(task.name);
            None
        }
    }
}

async fn commit_to_cache(
    task: &Task,
    working_dir: &Path,
    store: &CacheStore,
    result: &zr_process::ProcessResult,
) {
    let Ok(fingerprint) = zr_fingerprint::fingerprint(task, working_dir) else {
        return;
    };
    match store.admit(fingerprint).await {
        Ok(Admission::Owned(token)) => {
            let record = CacheRecord {
                exit_code: result.exit_code.unwrap_or(-1),
                stdout: String::new(),
                stderr: String::new(),
                duration_ms: result.duration_ms,
            };
            if let Err(source) = store.commit(token, fingerprint, &record).await {
                tracing::warn!(task = %task.name, error = %source, "failed to commit cache record");
            }
        }
        Ok(Admission::Hit(_) | Admission::BuiltByOther) => {
            // Someone else already committed this fingerprint; nothing to do.
        }
        Err(source) => {
            tracing::warn!(task = %task.name, error = %source, "failed to reserve cache slot for commit");
        }
    }
}

/// Resolves a task's working directory: its own `working_directory` (joined
/// onto `config_dir` when relative), else `config_dir` itself (spec §3).
#[must_use]
pub(crate) fn resolve_working_dir(task: &Task, config_dir: &Path) -> PathBuf {
    match &task.working_directory {
        Some(dir) => {
            let candidate = Path::new(dir);
            if candidate.is_absolute() {
                candidate.to_path_buf()
            } else {
                config_dir.join(candidate)
            }
        }
        None => config_dir.to_path_buf(),
    }
}

/// Merges the inherited environment with a task's declared overlay (spec
/// §3: "environment ... merged over the inherited environment").
#[must_use]
pub(crate) fn resolve_environment(task: &Task) -> Vec<(String, String)> {
    let inherited = zr_core::env::inherited();
    let merged = zr_core::env::merge(&inherited, &task.environment);
    zr_core::env::to_pairs(&merged)
}

/// Builds the `HashMap` view of a task's resolved environment used by
/// `zr_core::condition::evaluate` (spec §4.E step 2).
#[must_use]
pub(crate) fn environment_map(task: &Task) -> HashMap<String, String> {
    resolve_environment(task).into_iter().collect()
}

//! `run(spec) -> result` (spec §4.D): spawns a shell-interpreted command in
//! its own process group, streams its output, and enforces timeout,
//! cancellation, and best-effort resource ceilings.
//!
//! Grounded on `cuenv-core`'s `tasks/executor.rs::execute_task_non_hermetic`
//! (command construction, piped stdout/stderr, `tokio::process::Command`)
//! and `tasks/process_registry.rs` (process-group signaling via negative-pid
//! `libc::kill`, SIGTERM-then-SIGKILL escalation with a grace interval).

use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::process::{Child, Command};

use crate::error::{Error, Result};
use crate::limits;
use crate::result::{ProcessResult, ResourceEnforcement};
use crate::spec::ProcessSpec;
use crate::stream;

/// Grace period between a graceful termination signal and a hard kill
/// (spec §4.D: "if the child is still alive after a grace interval (≈2 s),
/// sends a hard kill").
const GRACE_PERIOD: Duration = Duration::from_secs(2);

/// Runs one task command to completion, enforcing its declared limits.
///
/// # Errors
///
/// Returns [`Error::SpawnFailed`] if the child could not be started at all
/// (no such program, permission denied, missing working directory).
pub async fn run(spec: ProcessSpec) -> Result<ProcessResult> {
    let mut command = build_command(&spec);
    let resource_enforcement =
        limits::apply(&mut command, spec.max_memory_bytes, spec.max_cpu_percent);

    zr_events::emit_task_started!(spec.task_name, spec.command, false);

    let start = Instant::now();
    let mut child = command
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| Error::SpawnFailed {
            command: spec.command.clone(),
            working_dir: spec.working_dir.clone(),
            source,
        })?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let stdout_task = stdout.map(|out| {
        tokio::spawn(stream::stream(
            out,
            spec.task_name.clone(),
            false,
            spec.output_sink.clone(),
        ))
    });
    let stderr_task = stderr.map(|err| {
        tokio::spawn(stream::stream(
            err,
            spec.task_name.clone(),
            true,
            spec.output_sink.clone(),
        ))
    });

    let outcome = await_with_deadline(&mut child, spec.timeout_ms, &spec.cancellation_handle).await;

    if let Some(task) = stdout_task {
        let _ = task.await;
    }
    if let Some(task) = stderr_task {
        let _ = task.await;
    }

    let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

    let (exit_code, timed_out, cancelled) = match outcome {
        Outcome::Exited(status) => (exit_code_of(&status), false, false),
        Outcome::WaitFailed => (None, false, false),
        Outcome::TimedOut => (reap_after_signal(&mut child).await, true, false),
        Outcome::Cancelled => (reap_after_signal(&mut child).await, false, true),
    };

    let result = ProcessResult::new(
        exit_code,
        timed_out,
        cancelled,
        duration_ms,
        resource_enforcement,
    );
    zr_events::emit_task_completed!(
        spec.task_name,
        result.success,
        result.exit_code.unwrap_or(-1),
        result.duration_ms
    );
    Ok(result)
}

enum Outcome {
    Exited(std::process::ExitStatus),
    WaitFailed,
    TimedOut,
    Cancelled,
}

async fn await_with_deadline(
    child: &mut Child,
    timeout_ms: u64,
    cancellation: &crate::cancellation::CancellationHandle,
) -> Outcome {
    let timeout = (timeout_ms > 0).then(|| tokio::time::sleep(Duration::from_millis(timeout_ms)));
    tokio::pin!(timeout);

    tokio::select! {
        biased;
        () = cancellation.cancelled() => Outcome::Cancelled,
        status = child.wait() => {
            match status {
                Ok(status) => Outcome::Exited(status),
                Err(error) => {
                    tracing::warn!(%error, "failed to wait on child process");
                    Outcome::WaitFailed
                }
            }
        }
        () = maybe_sleep(timeout.as_mut().as_pin_mut()) => Outcome::TimedOut,
    }
}

async fn maybe_sleep(sleep: Option<std::pin::Pin<&mut tokio::time::Sleep>>) {
    match sleep {
        Some(sleep) => sleep.await,
        None => std::future::pending().await,
    }
}

/// Escalates SIGTERM then SIGKILL against the child's process group,
/// waiting up to [`GRACE_PERIOD`] between them, then reaps it.
async fn reap_after_signal(child: &mut Child) -> Option<i32> {
    if let Some(pid) = child.id() {
        signal_process_group(pid, Signal::Terminate);
    }

    let graceful = tokio::time::timeout(GRACE_PERIOD, child.wait()).await;
    match graceful {
        Ok(Ok(status)) => return exit_code_of(&status),
        Ok(Err(error)) => {
            tracing::warn!(%error, "failed to wait on child after terminate signal");
        }
        Err(_elapsed) => {
            if let Some(pid) = child.id() {
                signal_process_group(pid, Signal::Kill);
            }
        }
    }

    match child.wait().await {
        Ok(status) => exit_code_of(&status),
        Err(error) => {
            tracing::warn!(%error, "failed to reap child after kill signal");
            None
        }
    }
}

enum Signal {
    Terminate,
    Kill,
}

#[cfg(unix)]
fn signal_process_group(pid: u32, signal: Signal) {
    let sig = match signal {
        Signal::Terminate => libc::SIGTERM,
        Signal::Kill => libc::SIGKILL,
    };
    // SAFETY: `libc::kill` with a negative pid signals the whole process
    // group. The pid was obtained from a child this process just spawned
    // with its own process group (see `build_command`), so the group is
    // guaranteed to exist and to be ours to signal.
    #[expect(unsafe_code, reason = "POSIX process-group signal delivery")]
    unsafe {
        libc::kill(-(pid as i32), sig);
    }
}

#[cfg(not(unix))]
fn signal_process_group(pid: u32, signal: Signal) {
    // No process-group concept on this platform; best effort against the
    // single process (child trees spawned by the command are not reachable
    // without a job object, which is not implemented).
    let _ = signal;
    tracing::debug!(pid, "process-group signaling unavailable on this platform");
}

#[cfg(unix)]
fn exit_code_of(status: &std::process::ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.code().or_else(|| status.signal().map(|sig| 128 + sig))
}

#[cfg(not(unix))]
fn exit_code_of(status: &std::process::ExitStatus) -> Option<i32> {
    status.code()
}

fn build_command(spec: &ProcessSpec) -> Command {
    let mut command = shell_command(&spec.command);
    command.current_dir(&spec.working_dir);
    for (key, value) in &spec.environment {
        command.env(key, value);
    }
    set_new_process_group(&mut command);
    command
}

#[cfg(unix)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

#[cfg(unix)]
fn set_new_process_group(command: &mut Command) {
    use std::os::unix::process::CommandExt;
    command.process_group(0);
}

#[cfg(not(unix))]
fn set_new_process_group(_command: &mut Command) {}

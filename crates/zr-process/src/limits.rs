//! Best-effort resource ceilings (spec §4.D): "platform facilities when
//! available (resource-limit syscalls on POSIX; job objects on the other
//! major OS). When unavailable, the limit is best-effort advisory."

use crate::result::ResourceEnforcement;

/// Applies whatever ceilings the current platform can enforce to `cmd`
/// before it spawns, returning which of them actually took effect.
pub fn apply(
    #[cfg_attr(not(unix), allow(unused_variables))] cmd: &mut tokio::process::Command,
    max_memory_bytes: Option<u64>,
    max_cpu_percent: Option<u32>,
) -> ResourceEnforcement {
    let memory_enforced = max_memory_bytes.is_some_and(|limit| apply_memory_limit(cmd, limit));
    // No POSIX syscall or portable job-object setting throttles CPU time as
    // a *percentage* (RLIMIT_CPU bounds total CPU seconds, not a rate); a
    // percentage ceiling is recorded but never enforced on any platform.
    let cpu_enforced = false;
    if max_cpu_percent.is_some() {
        tracing::debug!(
            max_cpu_percent,
            "max_cpu_percent is advisory only; no enforcement mechanism available"
        );
    }
    ResourceEnforcement {
        memory_enforced,
        cpu_enforced,
    }
}

#[cfg(unix)]
fn apply_memory_limit(cmd: &mut tokio::process::Command, max_memory_bytes: u64) -> bool {
    use std::os::unix::process::CommandExt;

    // SAFETY: `pre_exec` runs in the forked child between `fork` and `exec`.
    // `setrlimit` is async-signal-safe and touches only this process's own
    // limits; no heap allocation or non-async-signal-safe call is made here.
    #[expect(unsafe_code, reason = "POSIX rlimit application in a pre-exec hook")]
    unsafe {
        cmd.pre_exec(move || {
            let limit = libc::rlimit {
                rlim_cur: max_memory_bytes as libc::rlim_t,
                rlim_max: max_memory_bytes as libc::rlim_t,
            };
            if libc::setrlimit(libc::RLIMIT_AS, &limit) != 0 {
                return Err(std::io::Error::last_os_error());
            }
            Ok(())
        });
    }
    true
}

#[cfg(not(unix))]
fn apply_memory_limit(_cmd: &mut tokio::process::Command, _max_memory_bytes: u64) -> bool {
    // Job-object-based enforcement is not implemented; recorded as advisory.
    false
}

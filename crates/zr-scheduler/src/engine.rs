//! The admission-pool dispatch loop (spec §4.E).
//!
//! Unlike `zr-dag`'s own `get_parallel_groups`, which waits for an entire
//! level to drain before admitting the next, this loop admits any ready
//! task the moment a job slot and the resource ceiling allow it — a task in
//! level 3 can be running while a sibling in level 1 is still finishing, as
//! long as neither depends on the other.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;

use zr_cache::CacheStore;
use zr_core::{Configuration, ResourceLimits, Task};
use zr_process::{CancellationHandle, OutputSender};

use crate::expansion::TaskSubgraph;
use crate::options::Options;
use crate::result::{RunResult, TaskResult, TaskStatus};
use crate::worker::{self, WorkerContext};

/// Runs every task reachable in `subgraph` to completion and returns the
/// rolled-up [`RunResult`] (spec §4.E steps 1-9).
pub(crate) async fn dispatch(
    configuration: &Configuration,
    subgraph: &TaskSubgraph,
    options: &Options,
    output_sink: OutputSender,
) -> RunResult {
    let started = Instant::now();
    let names: Vec<String> = subgraph.levels.iter().flatten().cloned().collect();

    let mut state = State::new(configuration, subgraph, &names);

    let internal_cancellation = CancellationHandle::new();
    if let Some(external) = &options.task_control_handle {
        let external_cancel = external.process_cancellation();
        let linked = internal_cancellation.clone();
        tokio::spawn(async move {
            external_cancel.cancelled().await;
            linked.cancel();
        });
    }

    // Seed the frontier with every task that starts with no dependencies.
    for name in &names {
        if state.remaining_deps[name] == 0 {
            state.resolve(name);
        }
    }

    let mut running: HashMap<String, (u64, u64)> = HashMap::new();
    let (tx, mut rx) = mpsc::unbounded_channel::<(String, TaskResult)>();
    let mut cpu_in_use: u64 = 0;
    let mut mem_in_use: u64 = 0;
    let mut drained_for_cancel = false;

    loop {
        if internal_cancellation.is_cancelled() && !drained_for_cancel {
            state.cancel_remaining(&running);
            drained_for_cancel = true;
        }

        if !internal_cancellation.is_cancelled() {
            admit_ready(
                &mut state,
                &mut running,
                &mut cpu_in_use,
                &mut mem_in_use,
                configuration,
                options,
                &output_sink,
                &internal_cancellation,
                &tx,
            );
        }

        if running.is_empty() && state.pending_admit.is_empty() {
            break;
        }

        let Some((name, result)) = rx.recv().await else {
            break;
        };
        if let Some((cpu, mem)) = running.remove(&name) {
            cpu_in_use = cpu_in_use.saturating_sub(cpu);
            mem_in_use = mem_in_use.saturating_sub(mem);
        }
        let triggers_fail_fast = options.fail_fast && !result.success;
        state.finish(name, result);
        if triggers_fail_fast {
            internal_cancellation.cancel();
        }
    }

    let success = state.order.iter().all(|name| state.results[name].success);
    RunResult {
        success,
        elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        tasks: state
            .order
            .into_iter()
            .map(|name| state.results.remove(&name).expect("just finished"))
            .collect(),
    }
}

/// Mutable bookkeeping for one [`dispatch`] run: which tasks are still
/// waiting, which have been decided poisoned, and every terminal result
/// produced so far.
struct State<'a> {
    configuration: &'a Configuration,
    subgraph: &'a TaskSubgraph,
    remaining_deps: HashMap<String, usize>,
    poisoned: HashSet<String>,
    results: HashMap<String, TaskResult>,
    order: Vec<String>,
    pending_admit: BTreeSet<String>,
}

impl<'a> State<'a> {
    fn new(configuration: &'a Configuration, subgraph: &'a TaskSubgraph, names: &[String]) -> Self {
        let remaining_deps = names
            .iter()
            .map(|name| (name.clone(), subgraph.graph.direct_dependencies(name).len()))
            .collect();
        Self {
            configuration,
            subgraph,
            remaining_deps,
            poisoned: HashSet::new(),
            results: HashMap::new(),
            order: Vec::new(),
            pending_admit: BTreeSet::new(),
        }
    }

    /// Decides the fate of a task whose dependencies have all reached a
    /// terminal state: skip it (poisoned dependency, or a false
    /// `condition`), or queue it for admission (spec §4.E step 2).
    fn resolve(&mut self, name: &str) {
        if self.poisoned.contains(name) {
            self.finish(
                name.to_string(),
                TaskResult::skipped_due_to_dependency_failure(name.to_string()),
            );
            return;
        }

        let task = &self.configuration.tasks[name];
        if let Some(expr) = &task.condition {
            let env = worker::environment_map(task);
            match zr_core::condition::evaluate(expr, &env) {
                Ok(true) => {}
                Ok(false) => {
                    self.finish(name.to_string(), TaskResult::condition_skipped(name.to_string()));
                    return;
                }
                Err(source) => {
                    tracing::warn!(task = %name, error = %source, "condition evaluation failed; treating as failed");
                    self.finish(
                        name.to_string(),
                        TaskResult {
                            name: name.to_string(),
                            status: TaskStatus::Failed,
                            success: task.allow_failure,
                            exit_code: None,
                            duration_ms: 0,
                            from_cache: false,
                            retries_used: 0,
                        },
                    );
                    return;
                }
            }
        }

        self.pending_admit.insert(name.to_string());
    }

    /// Records a terminal result, then cascades it onto every direct
    /// dependent: decrement its remaining-dependency count, mark it
    /// poisoned if this result poisons dependents, and resolve it the
    /// moment its count reaches zero (spec §4.E step 7: "cascading skip").
    fn finish(&mut self, name: String, result: TaskResult) {
        let poisons = result.status.poisons_dependents();
        let dependents = self.subgraph.graph.direct_dependents(&name);
        self.order.push(name.clone());
        self.results.insert(name, result);

        for dependent in dependents {
            if poisons {
                self.poisoned.insert(dependent.clone());
            }
            let remaining = self
                .remaining_deps
                .get_mut(&dependent)
                .expect("dependent is part of the same subgraph");
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                self.resolve(&dependent);
            }
        }
    }

    /// Forces every task that hasn't reached a terminal state and isn't
    /// currently running into [`TaskStatus::Cancelled`] (spec §5
    /// "Cancellation": "no further task is admitted").
    fn cancel_remaining(&mut self, running: &HashMap<String, (u64, u64)>) {
        self.pending_admit.clear();
        let all_names: Vec<String> = self.remaining_deps.keys().cloned().collect();
        for name in all_names {
            if self.results.contains_key(&name) || running.contains_key(&name) {
                continue;
            }
            self.finish(
                name.clone(),
                TaskResult {
                    name,
                    status: TaskStatus::Cancelled,
                    success: false,
                    exit_code: None,
                    duration_ms: 0,
                    from_cache: false,
                    retries_used: 0,
                },
            );
        }
    }
}

/// Admits as many `pending_admit` tasks as the job-slot capacity and
/// resource ceiling currently allow, spawning one worker per admission
/// (spec §4.E step 4: "the admission pool ... fills the next free slot
/// with the next ready task").
#[allow(clippy::too_many_arguments)]
fn admit_ready(
    state: &mut State<'_>,
    running: &mut HashMap<String, (u64, u64)>,
    cpu_in_use: &mut u64,
    mem_in_use: &mut u64,
    configuration: &Configuration,
    options: &Options,
    output_sink: &OutputSender,
    cancellation: &CancellationHandle,
    tx: &mpsc::UnboundedSender<(String, TaskResult)>,
) {
    let capacity = options.effective_max_jobs();
    let ceiling = configuration.resource_limits;

    while running.len() < capacity {
        let Some(name) = next_admittable(
            &state.pending_admit,
            configuration,
            *cpu_in_use,
            *mem_in_use,
            ceiling,
            running.is_empty(),
        ) else {
            break;
        };
        state.pending_admit.remove(&name);

        let task = configuration.tasks[&name].clone();
        let task_cpu = u64::from(task.resource_limits.and_then(|l| l.max_cpu_percent).unwrap_or(0));
        let task_mem = task.resource_limits.and_then(|l| l.max_memory_bytes).unwrap_or(0);
        *cpu_in_use += task_cpu;
        *mem_in_use += task_mem;
        running.insert(name.clone(), (task_cpu, task_mem));

        let ctx = WorkerContext {
            working_dir: worker::resolve_working_dir(&task, &options.config_dir),
            environment: worker::resolve_environment(&task),
            cache_store: options.cache_store.clone(),
            output_sink: output_sink.clone(),
            cancellation: cancellation.clone(),
        };
        zr_events::emit_task_started!(task.name, task.command, false);
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = worker::run_task(&task, &ctx).await;
            zr_events::emit_task_completed!(result.name, result.success, result.exit_code, result.duration_ms);
            let _ = tx.send((task.name.clone(), result));
        });
    }
}

/// The lexicographically-first pending task that fits the remaining
/// resource ceiling, or (to guarantee forward progress when nothing is
/// running) the lexicographically-first pending task regardless of fit
/// (spec §4.E step 4: "a single task whose own ceiling exceeds the global
/// one is still admitted once nothing else is running").
fn next_admittable(
    pending: &BTreeSet<String>,
    configuration: &Configuration,
    cpu_in_use: u64,
    mem_in_use: u64,
    ceiling: Option<ResourceLimits>,
    running_is_empty: bool,
) -> Option<String> {
    for name in pending {
        let task: &Task = &configuration.tasks[name];
        let cpu = u64::from(task.resource_limits.and_then(|l| l.max_cpu_percent).unwrap_or(0));
        let mem = task.resource_limits.and_then(|l| l.max_memory_bytes).unwrap_or(0);
        let cpu_ok = ceiling
            .and_then(|c| c.max_cpu_percent)
            .is_none_or(|c| cpu_in_use + cpu <= u64::from(c));
        let mem_ok = ceiling
            .and_then(|c| c.max_memory_bytes)
            .is_none_or(|c| mem_in_use + mem <= c);
        if (cpu_ok && mem_ok) || running_is_empty {
            return Some(name.clone());
        }
    }
    None
}

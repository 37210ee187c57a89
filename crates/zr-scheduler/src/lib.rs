//! The scheduler (spec §2 component E, §4.E): walks a target set's
//! dependency sub-DAG and runs it under a continuously-admitting job pool,
//! rather than waiting for an entire dependency level to finish before
//! admitting the next (contrast `zr_dag::TaskGraph::get_parallel_groups`,
//! which is level-barrier and is used here only for dry-run reporting).

mod control;
mod engine;
mod error;
mod expansion;
mod node;
mod options;
mod result;
mod retry;
mod worker;
mod workflow;

pub use control::TaskControlHandle;
pub use error::{Error, Result};
pub use expansion::TaskSubgraph;
pub use options::Options;
pub use result::{RunResult, TaskResult, TaskStatus};
pub use workflow::run_workflow;

use zr_core::Configuration;

/// Runs every task in `target_tasks`, plus everything they transitively
/// depend on, to completion (spec §4.E: `run(configuration, target_tasks,
/// options) -> RunResult`).
///
/// # Errors
///
/// Returns [`Error::TaskNotFound`] if a target or one of its dependencies
/// does not resolve to a declared task, or [`Error::CycleDetected`] if the
/// reachable sub-DAG is cyclic. Both are detected before any task starts
/// (spec §7); once dispatch begins, every failure is recorded in the
/// returned [`RunResult`] instead.
pub async fn run(
    configuration: &Configuration,
    target_tasks: &[String],
    options: &Options,
) -> Result<RunResult> {
    let subgraph = expansion::build(configuration, target_tasks)?;
    let sink = match &options.output_sink {
        Some(sink) => sink.clone(),
        None => {
            // No caller-supplied sink: create one and let its receiver drop
            // immediately. `zr_process`'s sender degrades a closed-channel
            // send to a no-op, so captured output is simply discarded.
            let (tx, _rx) = zr_process::channel();
            tx
        }
    };
    Ok(engine::dispatch(configuration, &subgraph, options, sink).await)
}

/// Computes the reachable sub-DAG and its execution levels for
/// `target_tasks` without running anything (spec §4.E: "a dry-run planner
/// that reports levels and the would-run task set without executing").
///
/// # Errors
///
/// Same as [`run`].
pub fn plan_dry_run(configuration: &Configuration, target_tasks: &[String]) -> Result<TaskSubgraph> {
    expansion::build(configuration, target_tasks)
}

//! Running a whole [`zr_core::Workflow`] as its ordered sequence of stages
//! (spec §3: "Workflow — an ordered sequence of Stages ... each Stage ...
//! treated as one scheduler invocation").

use zr_core::{Configuration, Workflow};

use crate::error::Result;
use crate::options::Options;
use crate::result::RunResult;

/// Runs every stage of `workflow` in order, each as its own [`crate::run`]
/// invocation with that stage's own `fail_fast` policy.
///
/// A stage whose [`RunResult::success`] is `false` stops the workflow: later
/// stages are not started (spec §9 Open Question: an unstated
/// cross-stage failure policy, resolved to "stop" on the model of staged CI
/// pipelines, where a later stage typically assumes an earlier one
/// succeeded). The returned vector holds one [`RunResult`] per stage that
/// was actually started, in order.
///
/// # Errors
///
/// Returns [`crate::Error::TaskNotFound`] if a stage names a task the
/// configuration doesn't declare, surfaced from whichever stage fails to
/// resolve first.
pub async fn run_workflow(
    configuration: &Configuration,
    workflow: &Workflow,
    base_options: &Options,
) -> Result<Vec<RunResult>> {
    let mut results = Vec::with_capacity(workflow.stages.len());
    for stage in &workflow.stages {
        let mut options = base_options.clone();
        options.fail_fast = stage.fail_fast;

        let result = crate::run(configuration, &stage.tasks, &options).await?;
        let stop = !result.success;
        results.push(result);
        if stop {
            break;
        }
    }
    Ok(results)
}

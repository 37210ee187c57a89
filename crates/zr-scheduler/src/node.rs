//! Adapts `zr_core::Task` to `zr_dag::TaskNodeData` so `zr-dag`'s cycle
//! detection and level assignment can be reused for the task sub-DAG (spec
//! §4.E step 1, 3).

use zr_dag::TaskNodeData;

/// A graph node wrapping one task's name and its combined dependency list
/// (`parallel_dependencies` followed by `serial_dependencies`, spec §3).
#[derive(Debug, Clone)]
pub struct SchedNode {
    depends_on: Vec<String>,
}

impl SchedNode {
    pub(crate) fn new(task: &zr_core::Task) -> Self {
        Self {
            depends_on: task.all_dependencies(),
        }
    }
}

impl TaskNodeData for SchedNode {
    fn depends_on(&self) -> &[String] {
        &self.depends_on
    }
}

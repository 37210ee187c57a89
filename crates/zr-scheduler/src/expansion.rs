//! Building and validating the reachable sub-DAG for a target set (spec
//! §4.E step 1: "walk dependency edges to build the reachable sub-DAG").

use std::collections::{HashSet, VecDeque};

use zr_core::{Configuration, Task};
use zr_dag::TaskGraph;

use crate::error::{Error, Result};
use crate::node::SchedNode;

/// The sub-DAG reachable from a set of target tasks, plus the execution
/// levels computed over it (spec §4.B: "longest-path distance from a
/// root"), used for dry-run reporting and as a deterministic tie-break.
pub struct TaskSubgraph {
    pub(crate) graph: TaskGraph<SchedNode>,
    /// Task names in level order, each level sorted lexicographically
    /// (spec §4.B: "Tie-breaking for deterministic output").
    pub levels: Vec<Vec<String>>,
}

/// Walks dependency edges from `targets` to build the reachable sub-DAG,
/// validates that every referenced name resolves, chains
/// `serial_dependencies` among themselves, and rejects cycles.
///
/// # Errors
///
/// Returns [`Error::TaskNotFound`] for an undeclared target or dependency,
/// or [`Error::CycleDetected`] if the sub-DAG is cyclic.
pub fn build(configuration: &Configuration, targets: &[String]) -> Result<TaskSubgraph> {
    for target in targets {
        if !configuration.tasks.contains_key(target) {
            return Err(Error::TaskNotFound {
                name: target.clone(),
            });
        }
    }

    let mut graph: TaskGraph<SchedNode> = TaskGraph::new();
    let mut queue: VecDeque<String> = targets.iter().cloned().collect();
    let mut seen: HashSet<String> = HashSet::new();

    while let Some(name) = queue.pop_front() {
        if !seen.insert(name.clone()) {
            continue;
        }
        let task = configuration
            .tasks
            .get(&name)
            .ok_or_else(|| Error::TaskNotFound { name: name.clone() })?;
        graph.add_task(&name, SchedNode::new(task))?;
        for dep in task.all_dependencies() {
            if !configuration.tasks.contains_key(&dep) {
                return Err(Error::TaskNotFound { name: dep });
            }
            if !seen.contains(&dep) {
                queue.push_back(dep);
            }
        }
    }

    graph.add_dependency_edges()?;
    chain_serial_dependencies(&mut graph, configuration, &seen)?;

    if let Some(path) = graph.find_cycle() {
        return Err(Error::CycleDetected { path });
    }

    validate_conditions(configuration, &seen)?;

    let levels = sorted_levels(&graph)?;
    Ok(TaskSubgraph { graph, levels })
}

/// Rejects an unparsable `condition` expression before dispatch begins,
/// rather than only discovering it mid-run (spec §7: "configuration errors
/// abort the run before any task starts"). An empty environment is enough
/// to catch a syntax error; the actual values are irrelevant here.
fn validate_conditions(configuration: &Configuration, included: &HashSet<String>) -> Result<()> {
    for name in included {
        let task = configuration
            .tasks
            .get(name)
            .ok_or_else(|| Error::TaskNotFound { name: name.clone() })?;
        if let Some(expr) = &task.condition {
            zr_core::condition::evaluate(expr, &std::collections::HashMap::new()).map_err(
                |source| Error::InvalidCondition {
                    task: name.clone(),
                    source,
                },
            )?;
        }
    }
    Ok(())
}

/// Adds a direct edge between each consecutive pair of a task's
/// `serial_dependencies`, so the second is never admitted before the first
/// has reached a terminal state — an ordering constraint beyond simply being
/// a dependency of the same task (spec §3: "serial_dependencies (ordered
/// sequence of task names)").
fn chain_serial_dependencies(
    graph: &mut TaskGraph<SchedNode>,
    configuration: &Configuration,
    included: &HashSet<String>,
) -> Result<()> {
    for name in included {
        let task: &Task = configuration
            .tasks
            .get(name)
            .ok_or_else(|| Error::TaskNotFound { name: name.clone() })?;
        for pair in task.serial_dependencies.windows(2) {
            let (Some(from), Some(to)) = (
                graph.get_node_index(&pair[0]),
                graph.get_node_index(&pair[1]),
            ) else {
                continue;
            };
            graph.add_edge(from, to);
        }
    }
    Ok(())
}

/// Computes each task's longest-path level and groups names by level,
/// sorted lexicographically within each level (spec §4.B).
fn sorted_levels(graph: &TaskGraph<SchedNode>) -> Result<Vec<Vec<String>>> {
    use std::collections::HashMap;

    let mut level_of: HashMap<String, usize> = HashMap::new();
    let sorted = graph.topological_sort()?;

    for node in &sorted {
        let mut level = 0usize;
        for dep in node.task.dependency_names() {
            if let Some(&dep_level) = level_of.get(dep) {
                level = level.max(dep_level + 1);
            }
        }
        level_of.insert(node.name.clone(), level);
    }

    let max_level = level_of.values().copied().max();
    let Some(max_level) = max_level else {
        return Ok(Vec::new());
    };
    let mut levels: Vec<Vec<String>> = vec![Vec::new(); max_level + 1];
    for (name, level) in level_of {
        levels[level].push(name);
    }
    for level in &mut levels {
        level.sort();
    }
    Ok(levels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use zr_core::CachePolicy;

    fn task(name: &str, deps: &[&str]) -> Task {
        Task {
            name: name.to_string(),
            command: "true".to_string(),
            working_directory: None,
            environment: vec![],
            parallel_dependencies: deps.iter().map(|s| (*s).to_string()).collect(),
            serial_dependencies: vec![],
            tags: vec![],
            timeout_ms: 0,
            retry_max: 0,
            retry_delay_ms: 0,
            retry_exponential_backoff: false,
            max_concurrent_instances: 0,
            allow_failure: false,
            condition: None,
            cache_policy: CachePolicy::None,
            resource_limits: None,
            inputs_fingerprint_sources: vec![],
        }
    }

    fn config(tasks: Vec<Task>) -> Configuration {
        let mut cfg = Configuration::default();
        for t in tasks {
            cfg.tasks.insert(t.name.clone(), t);
        }
        cfg
    }

    #[test]
    fn linear_chain_produces_three_levels() {
        let cfg = config(vec![
            task("a", &[]),
            task("b", &["a"]),
            task("c", &["b"]),
        ]);
        let sub = build(&cfg, &["c".to_string()]).unwrap();
        assert_eq!(sub.levels, vec![vec!["a"], vec!["b"], vec!["c"]]);
    }

    #[test]
    fn diamond_groups_b_and_c_at_the_same_level() {
        let cfg = config(vec![
            task("a", &[]),
            task("b", &["a"]),
            task("c", &["a"]),
            task("d", &["b", "c"]),
        ]);
        let sub = build(&cfg, &["d".to_string()]).unwrap();
        assert_eq!(
            sub.levels,
            vec![vec!["a"], vec!["b", "c"], vec!["d"]]
        );
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let cfg = config(vec![task("a", &["a"])]);
        let err = build(&cfg, &["a".to_string()]).unwrap_err();
        assert!(matches!(err, Error::CycleDetected { .. }));
    }

    #[test]
    fn missing_dependency_is_task_not_found() {
        let cfg = config(vec![task("a", &["missing"])]);
        let err = build(&cfg, &["a".to_string()]).unwrap_err();
        assert!(matches!(err, Error::TaskNotFound { name } if name == "missing"));
    }

    #[test]
    fn serial_dependencies_chain_in_declared_order() {
        let mut x = task("x", &[]);
        x.name = "x".to_string();
        let y = task("y", &[]);
        let mut top = task("top", &[]);
        top.serial_dependencies = vec!["x".to_string(), "y".to_string()];
        let cfg = config(vec![x, y, top]);
        let sub = build(&cfg, &["top".to_string()]).unwrap();
        // "y" depends transitively on "x" finishing first, so it lands one
        // level above "x" even though neither declares the other as a dep.
        assert_eq!(sub.levels, vec![vec!["x"], vec!["y"], vec!["top"]]);
    }
}

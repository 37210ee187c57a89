//! Workspace member resolution and the member dependency graph (spec §4.H).
//!
//! This is distinct from [`crate::core::Workspace`], which models a
//! package-manager's own dependency graph (npm/pnpm/yarn/cargo lockfiles).
//! This module resolves `zr_core::Workspace`'s glob member patterns against
//! the filesystem and builds the member-to-member dependency DAG declared by
//! each member's `member_dependencies`, reusing `zr_dag` for cycle detection.

use std::path::Path;

use zr_core::Member;
use zr_dag::{TaskGraph, TaskNodeData};

use crate::error::{Error, Result};

/// A workspace member as a [`TaskNodeData`] node: depending on another member
/// means depending on everything that member's tasks produce.
#[derive(Debug, Clone)]
pub struct MemberNode {
    /// Path of the member, relative to the workspace root.
    pub path: String,
    depends_on: Vec<String>,
}

impl TaskNodeData for MemberNode {
    fn depends_on(&self) -> &[String] {
        &self.depends_on
    }
}

/// Resolves `patterns` (`*`/`?` glob segments, spec §4.H) against `repo_root`,
/// returning the matching directories that contain `config_file_name`,
/// sorted lexicographically by relative path for deterministic output.
///
/// Non-matching directories, and matching directories without a
/// configuration file, are silently ignored (spec §4.H: "non-matching
/// directories are ignored").
///
/// # Errors
///
/// Returns [`Error::InvalidMemberPattern`] if a pattern is not a valid glob.
pub fn resolve_member_paths(
    patterns: &[String],
    repo_root: &Path,
    config_file_name: &str,
) -> Result<Vec<String>> {
    let mut matched = std::collections::BTreeSet::new();

    for pattern in patterns {
        let full_pattern = repo_root.join(pattern);
        let full_pattern = full_pattern.to_string_lossy().into_owned();
        let paths = glob::glob(&full_pattern).map_err(|source| Error::InvalidMemberPattern {
            pattern: pattern.clone(),
            source,
        })?;

        for entry in paths.filter_map(std::result::Result::ok) {
            if !entry.is_dir() || !entry.join(config_file_name).is_file() {
                continue;
            }
            let Ok(relative) = entry.strip_prefix(repo_root) else {
                continue;
            };
            matched.insert(relative.to_string_lossy().replace('\\', "/"));
        }
    }

    Ok(matched.into_iter().collect())
}

/// Builds the member dependency DAG from already-loaded [`Member`] values
/// (spec §4.H: "Each member's own configuration contributes its declared
/// `member_dependencies`, producing the workspace DAG").
///
/// Loading each member's configuration to obtain its `member_dependencies`
/// is the caller's responsibility (configuration parsing is out of scope,
/// spec §1 Non-goals); this function only assembles and validates the graph.
///
/// # Errors
///
/// Returns [`Error::MemberGraphCycle`] if the member graph is not acyclic.
pub fn build_member_graph(members: &[Member]) -> Result<TaskGraph<MemberNode>> {
    let mut graph = TaskGraph::new();
    for member in members {
        graph
            .add_task(
                &member.path,
                MemberNode {
                    path: member.path.clone(),
                    depends_on: member.member_dependencies.clone(),
                },
            )
            .map_err(|source| Error::DependencyResolutionFailed {
                message: source.to_string(),
            })?;
    }
    graph
        .add_dependency_edges()
        .map_err(|source| Error::DependencyResolutionFailed {
            message: source.to_string(),
        })?;

    if let Some(path) = graph.find_cycle() {
        return Err(Error::MemberGraphCycle { path });
    }

    Ok(graph)
}

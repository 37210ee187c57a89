//! `expand_with_dependents(set, member_graph)` (spec §4.G step 4):
//! "additionally includes every member whose transitive `member_dependencies`
//! reach an affected member (i.e., reverse reachability in the workspace
//! graph)".
//!
//! Grounded on `zr_dag::TaskGraph::compute_affected`, which propagates
//! "affected" from a task to everything that (transitively) depends on it —
//! exactly reverse reachability when the graph's edges are member
//! dependencies.

use zr_dag::TaskGraph;
use zr_workspace::MemberNode;

use crate::detect::AffectedSet;

/// Expands `directly_affected` to include every member that transitively
/// depends on one of them.
#[must_use]
pub fn expand_with_dependents(
    directly_affected: &AffectedSet,
    member_graph: &TaskGraph<MemberNode>,
) -> AffectedSet {
    let all_members: Vec<String> = member_graph
        .iter_nodes()
        .map(|(_, node)| node.name.clone())
        .collect();

    member_graph
        .compute_affected(
            &all_members,
            |node: &MemberNode| directly_affected.contains(&node.path),
            None::<fn(&str) -> bool>,
        )
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use zr_core::Member;
    use zr_workspace::build_member_graph;

    fn member(path: &str, deps: &[&str]) -> Member {
        Member {
            path: path.to_string(),
            member_dependencies: deps.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn expand_includes_transitive_dependents() {
        let members = vec![
            member("core", &[]),
            member("mid", &["core"]),
            member("app", &["mid"]),
            member("unrelated", &[]),
        ];
        let graph = build_member_graph(&members).unwrap();

        let directly_affected = AffectedSet::from(["core".to_string()]);
        let expanded = expand_with_dependents(&directly_affected, &graph);

        assert_eq!(
            expanded,
            AffectedSet::from(["core".to_string(), "mid".to_string(), "app".to_string()])
        );
    }
}

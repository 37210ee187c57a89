//! `detect(base_ref, members, repo_root) -> affected_set` (spec §4.G).
//!
//! Grounded on `cuenv`'s `commands/git_hooks.rs::get_changed_files` (merge-base
//! plus `gix` tree diff) and `cuenv-core`'s `affected.rs` (longest member
//! prefix matching). Changed-file enumeration is pure `gix`, never shelling
//! out to the `git` binary.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use gix::bstr::ByteSlice;
use zr_core::Member;

use crate::error::{Error, Result};

/// The set of affected workspace member paths.
pub type AffectedSet = BTreeSet<String>;

/// Computes the directly-affected member set: every member whose directory
/// contains at least one file that changed between `base_ref` and `HEAD`.
///
/// The comparison is between `base_ref`'s merge-base with `HEAD` and `HEAD`'s
/// own tree (a three-dot diff, matching what a reviewer expects from a pull
/// request). Uncommitted worktree changes are not included; see `DESIGN.md`.
///
/// # Errors
///
/// Returns an error if the repository cannot be opened, `base_ref`/`HEAD`
/// cannot be resolved, no merge base exists, or the tree diff fails.
pub fn detect(base_ref: &str, members: &[Member], repo_root: &Path) -> Result<AffectedSet> {
    let changed = changed_files(base_ref, repo_root)?;
    Ok(affected_members(&changed, members))
}

/// Finds, for each changed file, the longest member-path prefix that
/// contains it, and returns the set of member paths so matched (spec §4.G
/// steps 2-3).
fn affected_members(changed_files: &[PathBuf], members: &[Member]) -> AffectedSet {
    let mut affected = AffectedSet::new();
    for file in changed_files {
        let mut best: Option<&Member> = None;
        for member in members {
            let member_path = Path::new(&member.path);
            if file.starts_with(member_path)
                && best.is_none_or(|current| member.path.len() > current.path.len())
            {
                best = Some(member);
            }
        }
        if let Some(member) = best {
            affected.insert(member.path.clone());
        }
    }
    affected
}

/// Lists the files that differ between `base_ref`'s merge-base with `HEAD`
/// and `HEAD` itself, as paths relative to the repository root.
fn changed_files(base_ref: &str, repo_root: &Path) -> Result<Vec<PathBuf>> {
    let repo = gix::open(repo_root).map_err(|source| Error::RepoOpenFailed {
        source: Box::new(source),
    })?;

    let head_id = repo
        .rev_parse_single("HEAD")
        .map_err(|source| Error::RevisionResolutionFailed {
            reference: "HEAD".to_string(),
            source: Box::new(source),
        })?
        .detach();
    let base_id = repo
        .rev_parse_single(base_ref)
        .map_err(|source| Error::RevisionResolutionFailed {
            reference: base_ref.to_string(),
            source: Box::new(source),
        })?
        .detach();

    let merge_base = repo
        .merge_bases_many(head_id, &[base_id])
        .map_err(|source| Error::MergeBaseFailed {
            base_ref: base_ref.to_string(),
            source: Box::new(source),
        })?
        .first()
        .map_or(base_id, |id| id.detach());

    let base_tree = tree_of(&repo, merge_base)?;
    let head_tree = tree_of(&repo, head_id)?;

    let mut changed = Vec::new();
    base_tree
        .changes()
        .map_err(|source| Error::DiffFailed {
            source: Box::new(source),
        })?
        .for_each_to_obtain_tree(&head_tree, |change| {
            changed.push(PathBuf::from(change.location().to_str_lossy().into_owned()));
            Ok::<_, std::convert::Infallible>(gix::object::tree::diff::Action::Continue)
        })
        .map_err(|source| Error::DiffFailed {
            source: Box::new(source),
        })?;

    Ok(changed)
}

fn tree_of(repo: &gix::Repository, commit_id: gix::ObjectId) -> Result<gix::Tree<'_>> {
    let commit = repo
        .find_commit(commit_id)
        .map_err(|source| Error::TreeLookupFailed {
            commit: commit_id.to_string(),
            source: Box::new(source),
        })?;
    commit.tree().map_err(|source| Error::TreeLookupFailed {
        commit: commit_id.to_string(),
        source: Box::new(source),
    })
}

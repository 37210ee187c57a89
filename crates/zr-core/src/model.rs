//! The shared data model: Task, Workflow, Stage, Workspace, Member, Configuration.
//!
//! These are plain, serde-deserializable value types. Parsing the on-disk
//! configuration syntax is a collaborator's responsibility (see spec §1);
//! this crate only defines the shape a collaborator must produce.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// How a task's cache behavior is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CachePolicy {
    /// The task is never cached; it always runs.
    #[default]
    None,
    /// The task is cached under its content fingerprint.
    Fingerprint,
}

/// Resource ceilings attached to a task or to the run as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResourceLimits {
    /// Advisory CPU percentage ceiling (100 = one core).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_cpu_percent: Option<u32>,
    /// Hard memory ceiling in bytes, where the platform supports enforcement.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_memory_bytes: Option<u64>,
}

/// A single named unit of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier within a [`Configuration`].
    pub name: String,
    /// Shell command string to execute. Empty means "pure orchestration of
    /// dependencies" — the task itself does nothing but gate its dependents.
    #[serde(default)]
    pub command: String,
    /// Working directory, relative to the configuration's directory when not absolute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<String>,
    /// Environment overlay, applied in order over the inherited environment.
    #[serde(default)]
    pub environment: Vec<(String, String)>,
    /// Dependencies with no ordering constraint between each other.
    #[serde(default)]
    pub parallel_dependencies: Vec<String>,
    /// Dependencies that must be admitted in the given order relative to each other.
    #[serde(default)]
    pub serial_dependencies: Vec<String>,
    /// Free-form tags used by filters and constraint checks.
    #[serde(default)]
    pub tags: Vec<String>,
    /// 0 disables the timeout.
    #[serde(default)]
    pub timeout_ms: u64,
    /// 0 disables retries.
    #[serde(default)]
    pub retry_max: u32,
    /// Base delay between retry attempts.
    #[serde(default)]
    pub retry_delay_ms: u64,
    /// When set, each retry's delay doubles the previous one.
    #[serde(default)]
    pub retry_exponential_backoff: bool,
    /// 0 means unbounded concurrent instances of this task.
    #[serde(default)]
    pub max_concurrent_instances: u32,
    /// When true, this task's failure does not poison dependents or the run result.
    #[serde(default)]
    pub allow_failure: bool,
    /// Optional expression evaluated before dispatch; false skips the task.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    /// Cache behavior for this task.
    #[serde(default)]
    pub cache_policy: CachePolicy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_limits: Option<ResourceLimits>,
    /// Declared input file globs/paths contributing to the fingerprint.
    #[serde(default)]
    pub inputs_fingerprint_sources: Vec<String>,
}

impl Task {
    /// All dependency names, parallel and serial, in declaration order
    /// (parallel first, then serial).
    #[must_use]
    pub fn all_dependencies(&self) -> Vec<String> {
        let mut deps = self.parallel_dependencies.clone();
        deps.extend(self.serial_dependencies.iter().cloned());
        deps
    }
}

/// A named set of tasks dispatched together within a [`Workflow`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    /// Stage name, unique within its workflow.
    pub name: String,
    /// Task names to run as one scheduler invocation.
    pub tasks: Vec<String>,
    /// When true, the first non-`allow_failure` failure cancels the rest of the stage.
    #[serde(default)]
    pub fail_fast: bool,
}

/// An ordered sequence of stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    /// Workflow name.
    pub name: String,
    /// Stages, executed in order.
    pub stages: Vec<Stage>,
}

/// One directory within a workspace holding its own configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// Path relative to the workspace root.
    pub path: String,
    /// Other members (by path) this member depends on.
    #[serde(default)]
    pub member_dependencies: Vec<String>,
}

/// Workspace-level configuration: member glob patterns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    /// Glob patterns (`*`/`?` segments) identifying member directories.
    pub members: Vec<String>,
}

/// A named bundle of overrides layered onto the base configuration (e.g. "ci", "local").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Environment overlay applied when this profile is active.
    #[serde(default)]
    pub environment: Vec<(String, String)>,
    /// Resource limits applied when this profile is active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_limits: Option<ResourceLimits>,
}

/// The root value a collaborator hands to `zr-scheduler`/`zr-affected`.
///
/// This crate makes no assumptions about file syntax: a `Configuration` is
/// constructed and owned by the caller, then borrowed read-only for the
/// duration of a run (see spec §3, Ownership).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    /// All declared tasks, keyed by name.
    pub tasks: BTreeMap<String, Task>,
    /// All declared workflows, keyed by name.
    #[serde(default)]
    pub workflows: BTreeMap<String, Workflow>,
    /// Workspace member glob patterns, if this configuration is workspace-aware.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace: Option<Workspace>,
    /// Global resource ceilings applied as an admission gate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_limits: Option<ResourceLimits>,
    /// Named override bundles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Configuration {
    /// Validates that every dependency name referenced by a task or workflow
    /// stage resolves to a defined task.
    ///
    /// This is the `ConfigurationInvalid` half of the DAG invariant in spec §3;
    /// cycle detection is a property of the graph itself and is the
    /// responsibility of `zr-dag` once a concrete sub-DAG has been built.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TaskNotFound`] for the first unresolved reference found.
    pub fn validate_references(&self) -> Result<()> {
        for task in self.tasks.values() {
            for dep in task.all_dependencies() {
                if !self.tasks.contains_key(&dep) {
                    return Err(Error::TaskNotFound { name: dep });
                }
            }
        }
        for workflow in self.workflows.values() {
            for stage in &workflow.stages {
                for task_name in &stage.tasks {
                    if !self.tasks.contains_key(task_name) {
                        return Err(Error::TaskNotFound {
                            name: task_name.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Applies a named profile's environment and resource-limit overlay onto a
    /// fresh copy of this configuration. Unknown profile names are a no-op
    /// (the caller decides whether that is itself an error).
    #[must_use]
    pub fn with_profile(&self, profile_name: &str) -> Self {
        let Some(profile) = self.profiles.get(profile_name) else {
            return self.clone();
        };
        let mut out = self.clone();
        if let Some(limits) = profile.resource_limits {
            out.resource_limits = Some(limits);
        }
        if !profile.environment.is_empty() {
            for task in out.tasks.values_mut() {
                task.environment
                    .extend(profile.environment.iter().cloned());
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn validate_references_passes_for_known_deps() {
        let mut cfg = Configuration::default();
        cfg.tasks.insert("a".into(), task("a", &[]));
        cfg.tasks.insert("b".into(), task("b", &["a"]));
        assert!(cfg.validate_references().is_ok());
    }

    #[test]
    fn validate_references_flags_unknown_dep() {
        let mut cfg = Configuration::default();
        cfg.tasks.insert("b".into(), task("b", &["missing"]));
        let err = cfg.validate_references().unwrap_err();
        assert!(matches!(err, Error::TaskNotFound { name } if name == "missing"));
    }

    #[test]
    fn with_profile_overlays_environment() {
        let mut cfg = Configuration::default();
        cfg.tasks.insert("a".into(), task("a", &[]));
        cfg.profiles.insert(
            "ci".into(),
            Profile {
                environment: vec![("CI".into(), "true".into())],
                resource_limits: None,
            },
        );
        let overlaid = cfg.with_profile("ci");
        assert_eq!(
            overlaid.tasks["a"].environment,
            vec![("CI".to_string(), "true".to_string())]
        );
    }

    #[test]
    fn unknown_profile_is_a_no_op() {
        let cfg = Configuration::default();
        let same = cfg.with_profile("does-not-exist");
        assert_eq!(cfg, same);
    }
}

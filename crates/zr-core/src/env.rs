//! Environment merging.
//!
//! Grounded on `cuenv-core`'s `Environment` type (`environment.rs`): an
//! ordered overlay of `(key, value)` pairs applied over the process's
//! inherited environment, plus a canonical sorted-by-key view used when
//! building a task's fingerprint (spec §4.A, step 3).

use std::collections::BTreeMap;

/// Merges an inherited environment with an ordered task-level overlay.
///
/// Later entries in `overlay` win on key collision, matching the "merged
/// over the inherited environment" wording in spec §3.
#[must_use]
pub fn merge(inherited: &BTreeMap<String, String>, overlay: &[(String, String)]) -> BTreeMap<String, String> {
    let mut merged = inherited.clone();
    for (key, value) in overlay {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Captures the current process environment as a sorted map.
#[must_use]
pub fn inherited() -> BTreeMap<String, String> {
    std::env::vars().collect()
}

/// Renders an environment map as `KEY=VALUE` pairs suitable for
/// `std::process::Command::envs`.
#[must_use]
pub fn to_pairs(env: &BTreeMap<String, String>) -> Vec<(String, String)> {
    env.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
}

//! Content fingerprinting of a task's declared inputs (spec §4.A).
//!
//! `fingerprint(task, working_dir)` concatenates, in a fixed order with
//! length-prefix framing, the task's command string, its canonicalized
//! working directory, its declared environment sorted by key, the content of
//! every declared input file (directories are recursed depth-first in sorted
//! order, **not** following symlinks — this diverges intentionally from
//! `cuenv-core`'s `InputResolver`, which follows symlinks; see `DESIGN.md`),
//! and the `os-arch` platform tag. The result is hashed with SHA-256.
//!
//! A missing declared input does not fail the computation: it contributes a
//! distinguished sentinel digest for that entry so the overall fingerprint
//! differs from any run where the file was present (spec §4.A, Failure modes).

mod error;

pub use error::{Error, Result};

use sha2::{Digest as _, Sha256};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use zr_core::Task;

/// A 256-bit content digest, hex-encoded as the cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Hex-encodes the digest; this is the cache key used by `zr-cache`.
    #[must_use]
    pub fn to_hex(self) -> String {
        hex::encode(self.0)
    }

    /// The raw digest bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// The first two hex characters, used as the cache's shard directory
    /// (spec §6: `cache/<ab>/<fingerprint>`).
    #[must_use]
    pub fn shard(self) -> String {
        self.to_hex()[..2].to_string()
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

fn frame(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

/// Computes the fingerprint of a task given its resolved working directory.
///
/// `working_dir` is the already-resolved directory the task will execute in
/// (defaulting to the configuration directory per spec §3 is the caller's
/// responsibility, mirroring how `cuenv-core`'s executor resolves
/// `working_dir` before building the `Command`).
///
/// # Errors
///
/// Returns an error only if the working directory itself cannot be
/// canonicalized, or an input file exists but cannot be read (permission
/// denied and similar). A simply-absent input file is not an error (see
/// module docs).
pub fn fingerprint(task: &Task, working_dir: &Path) -> Result<Fingerprint> {
    let mut hasher = Sha256::new();

    frame(&mut hasher, task.command.as_bytes());

    let canonical_working_dir =
        std::fs::canonicalize(working_dir).map_err(|source| Error::WorkingDirectory {
            path: working_dir.to_path_buf(),
            source,
        })?;
    frame(
        &mut hasher,
        canonical_working_dir.to_string_lossy().as_bytes(),
    );

    let mut env_pairs: Vec<(&String, &String)> =
        task.environment.iter().map(|(k, v)| (k, v)).collect();
    env_pairs.sort_by(|a, b| a.0.cmp(b.0));
    for (key, value) in env_pairs {
        frame(&mut hasher, key.as_bytes());
        frame(&mut hasher, value.as_bytes());
    }

    let mut sources: Vec<&String> = task.inputs_fingerprint_sources.iter().collect();
    sources.sort();
    for source in sources {
        let path = resolve_source_path(&canonical_working_dir, source);
        hash_input(&mut hasher, &path)?;
    }

    frame(&mut hasher, zr_core::platform::tag().as_bytes());

    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    Ok(Fingerprint(out))
}

fn resolve_source_path(working_dir: &Path, source: &str) -> PathBuf {
    let candidate = Path::new(source);
    if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        working_dir.join(candidate)
    }
}

/// Hashes one declared input (file or directory) into the running fingerprint.
fn hash_input(hasher: &mut Sha256, path: &Path) -> Result<()> {
    let Ok(metadata) = std::fs::symlink_metadata(path) else {
        hash_missing(hasher, path);
        return Ok(());
    };

    if metadata.is_dir() {
        hash_directory(hasher, path)
    } else if metadata.file_type().is_symlink() {
        // Symlinks are never followed (spec §4.A); treat as an opaque,
        // unresolved input so fingerprints don't depend on link targets.
        hash_missing(hasher, path);
        Ok(())
    } else {
        hash_file(hasher, path)
    }
}

fn hash_missing(hasher: &mut Sha256, path: &Path) {
    tracing::debug!(path = %path.display(), "declared input missing; using sentinel digest");
    let marker = format!("<missing:{}>", path.display());
    frame(hasher, path.to_string_lossy().as_bytes());
    frame(hasher, marker.as_bytes());
}

fn hash_file(hasher: &mut Sha256, path: &Path) -> Result<()> {
    let canonical = std::fs::canonicalize(path).map_err(|source| Error::ReadInput {
        path: path.to_path_buf(),
        source,
    })?;
    let content = std::fs::read(&canonical).map_err(|source| Error::ReadInput {
        path: canonical.clone(),
        source,
    })?;
    let mut content_hasher = Sha256::new();
    content_hasher.update(&content);
    let content_digest = content_hasher.finalize();

    frame(hasher, canonical.to_string_lossy().as_bytes());
    frame(hasher, &(content.len() as u64).to_le_bytes());
    frame(hasher, &content_digest);
    Ok(())
}

fn hash_directory(hasher: &mut Sha256, dir: &Path) -> Result<()> {
    let mut relative_files = BTreeSet::new();
    for entry in walkdir::WalkDir::new(dir)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(error = %err, "skipping unreadable directory entry during fingerprinting");
                continue;
            }
        };
        if entry.file_type().is_file() {
            if let Ok(rel) = entry.path().strip_prefix(dir) {
                relative_files.insert(rel.to_path_buf());
            }
        }
    }
    for rel in relative_files {
        hash_file(hasher, &dir.join(&rel))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use zr_core::{CachePolicy, Task};

    fn base_task() -> Task {
        Task {
            name: "build".to_string(),
            command: "echo hi".to_string(),
            working_directory: None,
            environment: vec![],
            parallel_dependencies: vec![],
            serial_dependencies: vec![],
            tags: vec![],
            timeout_ms: 0,
            retry_max: 0,
            retry_delay_ms: 0,
            retry_exponential_backoff: false,
            max_concurrent_instances: 0,
            allow_failure: false,
            condition: None,
            cache_policy: CachePolicy::Fingerprint,
            resource_limits: None,
            inputs_fingerprint_sources: vec![],
        }
    }

    #[test]
    fn identical_tasks_produce_identical_fingerprints() {
        let dir = tempfile::tempdir().unwrap();
        let task = base_task();
        let a = fingerprint(&task, dir.path()).unwrap();
        let b = fingerprint(&task, dir.path()).unwrap();
        assert_eq!(a.to_hex(), b.to_hex());
    }

    #[test]
    fn command_change_changes_fingerprint() {
        let dir = tempfile::tempdir().unwrap();
        let mut task = base_task();
        let a = fingerprint(&task, dir.path()).unwrap();
        task.command = "echo bye".to_string();
        let b = fingerprint(&task, dir.path()).unwrap();
        assert_ne!(a.to_hex(), b.to_hex());
    }

    #[test]
    fn env_order_does_not_matter() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = base_task();
        a.environment = vec![("A".into(), "1".into()), ("B".into(), "2".into())];
        let mut b = base_task();
        b.environment = vec![("B".into(), "2".into()), ("A".into(), "1".into())];
        assert_eq!(
            fingerprint(&a, dir.path()).unwrap().to_hex(),
            fingerprint(&b, dir.path()).unwrap().to_hex()
        );
    }

    #[test]
    fn input_file_content_change_changes_fingerprint() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("input.txt");
        fs::write(&file_path, b"v1").unwrap();
        let mut task = base_task();
        task.inputs_fingerprint_sources = vec!["input.txt".to_string()];
        let a = fingerprint(&task, dir.path()).unwrap();
        fs::write(&file_path, b"v2").unwrap();
        let b = fingerprint(&task, dir.path()).unwrap();
        assert_ne!(a.to_hex(), b.to_hex());
    }

    #[test]
    fn missing_input_does_not_error_and_is_distinguishable() {
        let dir = tempfile::tempdir().unwrap();
        let mut task = base_task();
        task.inputs_fingerprint_sources = vec!["does-not-exist.txt".to_string()];
        let missing = fingerprint(&task, dir.path()).unwrap();

        fs::write(dir.path().join("does-not-exist.txt"), b"now it exists").unwrap();
        let present = fingerprint(&task, dir.path()).unwrap();

        assert_ne!(missing.to_hex(), present.to_hex());
    }

    #[test]
    fn directory_input_recurses_sorted_and_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("src");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("b.rs"), b"b").unwrap();
        fs::write(nested.join("a.rs"), b"a").unwrap();

        let mut task = base_task();
        task.inputs_fingerprint_sources = vec!["src".to_string()];
        let a = fingerprint(&task, dir.path()).unwrap();

        fs::write(nested.join("a.rs"), b"a-changed").unwrap();
        let b = fingerprint(&task, dir.path()).unwrap();

        assert_ne!(a.to_hex(), b.to_hex());
    }

    #[test]
    fn shard_is_first_two_hex_chars() {
        let dir = tempfile::tempdir().unwrap();
        let task = base_task();
        let fp = fingerprint(&task, dir.path()).unwrap();
        assert_eq!(fp.shard(), fp.to_hex()[..2].to_string());
    }
}

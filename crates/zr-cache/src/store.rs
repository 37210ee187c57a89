//! The cache store contract (spec §4.C): `lookup`, `reserve`, `commit`,
//! `clear_all`, `stats`.
//!
//! Layout (spec §6): `<user-cache>/zr/cache/<first-two-hex>/<fingerprint>`
//! plus a sibling `<fingerprint>.lock` while a build is in flight. Grounded
//! on `cuenv-core`'s cache directory resolution (`paths.rs::cache_dir`) for
//! the environment-variable-override convention, and on its
//! temp-file-then-rename commit idiom (`cache/cas.rs::store`).

use std::path::{Path, PathBuf};

use zr_fingerprint::Fingerprint;

use crate::error::{Error, Result};
use crate::lock::{self, ReserveToken, Reservation};
use crate::record::CacheRecord;

/// Environment variable that overrides the cache root directory, mirroring
/// `cuenv`'s `CUENV_CACHE_DIR` convention.
pub const CACHE_DIR_ENV: &str = "ZR_CACHE_DIR";

/// Aggregate cache statistics (spec §4.C: `stats() -> {count, bytes, directory}`).
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Number of committed records.
    pub count: u64,
    /// Total bytes occupied by committed records.
    pub bytes: u64,
    /// The cache's root directory.
    pub directory: PathBuf,
}

/// Outcome of a `lookup`-then-maybe-`reserve` admission step.
pub enum Admission {
    /// A committed record was found; the task need not run.
    Hit(CacheRecord),
    /// No record existed and the caller now owns the build slot.
    Owned(ReserveToken),
    /// No record existed yet, but another run is building it; the caller
    /// should re-`lookup` the fingerprint.
    BuiltByOther,
}

/// A content-addressed, fingerprint-keyed cache store rooted at one
/// directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    /// Opens a store rooted at an explicit directory, creating it if absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the directory cannot be created.
    pub fn open(root: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&root).map_err(|source| Error::Io {
            operation: "create cache directory",
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    /// Opens the store at the default per-user cache directory
    /// (`ZR_CACHE_DIR` override, else the platform cache dir + `zr/cache`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoCacheDirectory`] if no writable location can be
    /// determined, or [`Error::Io`] if it cannot be created.
    pub fn open_default() -> Result<Self> {
        let root = default_root()?;
        Self::open(root)
    }

    /// The cache's root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, fingerprint: Fingerprint) -> PathBuf {
        self.root
            .join(fingerprint.shard())
            .join(fingerprint.to_hex())
    }

    fn lock_path(&self, fingerprint: Fingerprint) -> PathBuf {
        let mut path = self.record_path(fingerprint).into_os_string();
        path.push(".lock");
        PathBuf::from(path)
    }

    /// Looks up a committed record by fingerprint.
    ///
    /// A read failure (corrupt record, permission denied) degrades to a miss
    /// per spec §7's cache-IO propagation rule; the underlying error is
    /// logged, not propagated.
    pub async fn lookup(&self, fingerprint: Fingerprint) -> Option<CacheRecord> {
        let path = self.record_path(fingerprint);
        match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<CacheRecord>(&bytes) {
                Ok(record) => Some(record),
                Err(source) => {
                    tracing::warn!(path = %path.display(), error = %source, "corrupt cache record treated as a miss");
                    None
                }
            },
            Err(_) => None,
        }
    }

    /// Attempts to reserve the exclusive build slot for `fingerprint`,
    /// first checking for an existing committed record (spec §4.E:
    /// "cache check ... on miss: reserve the fingerprint lock").
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the lock file cannot be created or polled.
    pub async fn admit(&self, fingerprint: Fingerprint) -> Result<Admission> {
        if let Some(record) = self.lookup(fingerprint).await {
            return Ok(Admission::Hit(record));
        }
        let record_path = self.record_path(fingerprint);
        let lock_path = self.lock_path(fingerprint);
        match lock::reserve(&lock_path, &record_path).await? {
            Reservation::Owned(token) => Ok(Admission::Owned(token)),
            Reservation::BuiltByOther => Ok(Admission::BuiltByOther),
        }
    }

    /// Commits a record, atomically replacing any partial write, then
    /// releases the reservation lock.
    ///
    /// Per spec §7, a write failure here degrades gracefully: the caller
    /// still has its `CacheRecord` in hand and can hand the result to the
    /// user uncached.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] or [`Error::Corrupt`] on a failed write.
    pub async fn commit(
        &self,
        token: ReserveToken,
        fingerprint: Fingerprint,
        record: &CacheRecord,
    ) -> Result<()> {
        let final_path = self.record_path(fingerprint);
        if let Some(parent) = final_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| Error::Io {
                    operation: "create shard directory",
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let bytes = serde_json::to_vec(record).map_err(|source| Error::Corrupt {
            path: final_path.clone(),
            source,
        })?;

        let temp_path = final_path.with_extension("tmp");
        tokio::fs::write(&temp_path, &bytes)
            .await
            .map_err(|source| Error::Io {
                operation: "write temp cache record",
                path: temp_path.clone(),
                source,
            })?;
        tokio::fs::rename(&temp_path, &final_path)
            .await
            .map_err(|source| Error::Io {
                operation: "commit cache record",
                path: final_path.clone(),
                source,
            })?;

        token.release().await
    }

    /// Removes the entire cache directory, returning the number of committed
    /// records it held.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the directory cannot be walked or removed.
    pub async fn clear_all(&self) -> Result<u64> {
        let stats = self.stats().await?;
        if self.root.exists() {
            tokio::fs::remove_dir_all(&self.root)
                .await
                .map_err(|source| Error::Io {
                    operation: "remove cache directory",
                    path: self.root.clone(),
                    source,
                })?;
        }
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|source| Error::Io {
                operation: "recreate cache directory",
                path: self.root.clone(),
                source,
            })?;
        Ok(stats.count)
    }

    /// Reports aggregate statistics over committed records (lock files are
    /// not counted).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the cache directory cannot be walked.
    pub async fn stats(&self) -> Result<CacheStats> {
        let mut count = 0u64;
        let mut bytes = 0u64;
        let root = self.root.clone();
        let walked = tokio::task::spawn_blocking(move || walk_records(&root))
            .await
            .map_err(|source| Error::Io {
                operation: "join cache walk",
                path: self.root.clone(),
                source: std::io::Error::other(source),
            })??;
        for size in walked {
            count += 1;
            bytes += size;
        }
        Ok(CacheStats {
            count,
            bytes,
            directory: self.root.clone(),
        })
    }
}

fn walk_records(root: &Path) -> Result<Vec<u64>> {
    let mut sizes = Vec::new();
    if !root.exists() {
        return Ok(sizes);
    }
    for shard in std::fs::read_dir(root).map_err(|source| Error::Io {
        operation: "read cache directory",
        path: root.to_path_buf(),
        source,
    })? {
        let shard = shard.map_err(|source| Error::Io {
            operation: "read cache shard entry",
            path: root.to_path_buf(),
            source,
        })?;
        if !shard.file_type().map(|ft| ft.is_dir()).unwrap_or(false) {
            continue;
        }
        for entry in std::fs::read_dir(shard.path()).map_err(|source| Error::Io {
            operation: "read cache shard",
            path: shard.path(),
            source,
        })? {
            let entry = entry.map_err(|source| Error::Io {
                operation: "read cache record entry",
                path: shard.path(),
                source,
            })?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "lock" || ext == "tmp") {
                continue;
            }
            if let Ok(metadata) = entry.metadata() {
                if metadata.is_file() {
                    sizes.push(metadata.len());
                }
            }
        }
    }
    Ok(sizes)
}

fn default_root() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(CACHE_DIR_ENV) {
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir).join("cache"));
        }
    }
    let base = dirs::cache_dir().ok_or_else(|| Error::NoCacheDirectory {
        tried: format!("{CACHE_DIR_ENV} env var, dirs::cache_dir()"),
    })?;
    Ok(base.join("zr").join("cache"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> CacheRecord {
        CacheRecord {
            exit_code: 0,
            stdout: "hello\n".to_string(),
            stderr: String::new(),
            duration_ms: 42,
        }
    }

    fn fp(tag: u8) -> Fingerprint {
        let task = zr_core::Task {
            name: "t".into(),
            command: format!("echo {tag}"),
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
            cache_policy: zr_core::CachePolicy::Fingerprint,
            resource_limits: None,
            inputs_fingerprint_sources: vec![],
        };
        let dir = tempfile::tempdir().unwrap();
        zr_fingerprint::fingerprint(&task, dir.path()).unwrap()
    }

    #[tokio::test]
    async fn miss_then_reserve_then_commit_then_hit() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::open(dir.path().to_path_buf()).unwrap();
        let fingerprint = fp(1);

        assert!(store.lookup(fingerprint).await.is_none());

        let token = match store.admit(fingerprint).await.unwrap() {
            Admission::Owned(token) => token,
            _ => panic!("expected to own the reservation on first admit"),
        };

        store.commit(token, fingerprint, &record()).await.unwrap();

        let hit = store.lookup(fingerprint).await.unwrap();
        assert_eq!(hit, record());
    }

    #[tokio::test]
    async fn admit_reports_hit_without_reserving_again() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::open(dir.path().to_path_buf()).unwrap();
        let fingerprint = fp(2);

        let token = match store.admit(fingerprint).await.unwrap() {
            Admission::Owned(token) => token,
            _ => panic!("expected owned reservation"),
        };
        store.commit(token, fingerprint, &record()).await.unwrap();

        match store.admit(fingerprint).await.unwrap() {
            Admission::Hit(r) => assert_eq!(r, record()),
            _ => panic!("expected a hit on the second admit"),
        }
    }

    #[tokio::test]
    async fn clear_all_empties_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::open(dir.path().to_path_buf()).unwrap();
        let fingerprint = fp(3);

        let token = match store.admit(fingerprint).await.unwrap() {
            Admission::Owned(token) => token,
            _ => panic!("expected owned reservation"),
        };
        store.commit(token, fingerprint, &record()).await.unwrap();

        let cleared = store.clear_all().await.unwrap();
        assert_eq!(cleared, 1);
        assert!(store.lookup(fingerprint).await.is_none());
    }

    #[tokio::test]
    async fn stats_reports_count_and_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::open(dir.path().to_path_buf()).unwrap();
        let fingerprint = fp(4);

        let token = match store.admit(fingerprint).await.unwrap() {
            Admission::Owned(token) => token,
            _ => panic!("expected owned reservation"),
        };
        store.commit(token, fingerprint, &record()).await.unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.count, 1);
        assert!(stats.bytes > 0);
        assert_eq!(stats.directory, dir.path());
    }
}

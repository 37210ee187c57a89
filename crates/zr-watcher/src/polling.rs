//! Polling backend: periodic `stat` over the declared paths, comparing
//! mtime+size snapshots (spec §4.F, `mode = "polling"`).
//!
//! Used when no native OS facility is available, or when the caller asks for
//! it explicitly (e.g. watching a network filesystem where inotify is
//! unreliable).

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::SystemTime;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::error::{Error, Result};

type Snapshot = HashMap<PathBuf, (SystemTime, u64)>;

/// Owns the background polling task; dropping this aborts it.
pub struct PollingBackend {
    task: JoinHandle<()>,
}

impl PollingBackend {
    pub fn start(
        paths: &[PathBuf],
        poll_interval_ms: u64,
        tx: UnboundedSender<PathBuf>,
    ) -> Result<Self> {
        for path in paths {
            if !path.exists() {
                return Err(Error::PathNotFound {
                    path: path.clone(),
                });
            }
        }

        let paths = paths.to_vec();
        let interval = std::time::Duration::from_millis(poll_interval_ms.max(1));
        let task = tokio::spawn(async move {
            let mut previous = snapshot(&paths).await;
            loop {
                tokio::time::sleep(interval).await;
                let current = snapshot(&paths).await;
                for (path, meta) in &current {
                    if previous.get(path) != Some(meta) && tx.send(path.clone()).is_err() {
                        return;
                    }
                }
                for path in previous.keys() {
                    if !current.contains_key(path) && tx.send(path.clone()).is_err() {
                        return;
                    }
                }
                previous = current;
            }
        });

        Ok(Self { task })
    }
}

impl Drop for PollingBackend {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn snapshot(paths: &[PathBuf]) -> Snapshot {
    let paths = paths.to_vec();
    tokio::task::spawn_blocking(move || {
        let mut out = Snapshot::new();
        for root in &paths {
            for entry in walkdir::WalkDir::new(root)
                .follow_links(false)
                .into_iter()
                .filter_map(std::result::Result::ok)
            {
                if !entry.file_type().is_file() {
                    continue;
                }
                if let Ok(meta) = entry.metadata() {
                    let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
                    out.insert(entry.path().to_path_buf(), (modified, meta.len()));
                }
            }
        }
        out
    })
    .await
    .unwrap_or_default()
}

//! Native backend: OS-level change notification via `notify`'s recommended
//! watcher (inotify / FSEvents / ReadDirectoryChanges, depending on host).

use std::path::{Path, PathBuf};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher as _};
use tokio::sync::mpsc::UnboundedSender;

use crate::error::{Error, Result};

/// Owns the live OS watch handle; dropping this tears the watch down.
pub struct NativeBackend {
    _watcher: RecommendedWatcher,
}

impl NativeBackend {
    pub fn start(paths: &[PathBuf], tx: UnboundedSender<PathBuf>) -> Result<Self> {
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res
        {
            Ok(event) => {
                for path in event.paths {
                    let _ = tx.send(path);
                }
            }
            Err(error) => {
                tracing::warn!(%error, "native watcher backend reported an error");
            }
        })
        .map_err(|source| Error::WatchFailed {
            path: paths.first().cloned().unwrap_or_default(),
            source,
        })?;

        for path in paths {
            watch_one(&mut watcher, path)?;
        }

        Ok(Self { _watcher: watcher })
    }
}

fn watch_one(watcher: &mut RecommendedWatcher, path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(Error::PathNotFound {
            path: path.to_path_buf(),
        });
    }
    watcher
        .watch(path, RecursiveMode::Recursive)
        .map_err(|source| Error::WatchFailed {
            path: path.to_path_buf(),
            source,
        })
}

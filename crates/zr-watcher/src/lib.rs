//! Filesystem change notification (spec §2 component F, §4.F).
//!
//! `Watcher::init` sets up either a native OS backend (`notify`, preferring
//! inotify/FSEvents/ReadDirectoryChanges) or a manual polling backend, and
//! `wait_for_change` blocks until at least one watched path changes,
//! debouncing consecutive rapid changes into a single event.

mod error;
mod event;
mod native;
mod polling;

use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

pub use error::{Error, Result};
pub use event::ChangeEvent;

use native::NativeBackend;
use polling::PollingBackend;

/// How the watcher observes filesystem changes (spec §4.F: "`mode` is
/// `native`... or `polling`").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchMode {
    /// OS-native facility: inotify, FSEvents, or ReadDirectoryChanges.
    Native,
    /// Periodic `stat` over the declared paths, comparing mtime+size.
    Polling,
}

/// The quiet interval the watcher waits for after the first event before
/// returning (spec §4.F: "waits for a quiet interval (≈100 ms)").
const DEBOUNCE: Duration = Duration::from_millis(100);

enum Backend {
    Native(NativeBackend),
    Polling(PollingBackend),
}

/// A live filesystem watch over a set of paths.
///
/// The watch is torn down when the `Watcher` is dropped (spec §3
/// Lifecycles: "Watcher subscriptions exist from registration until
/// explicit teardown").
pub struct Watcher {
    _backend: Backend,
    rx: UnboundedReceiver<PathBuf>,
}

impl Watcher {
    /// Begins watching `paths` in the given `mode`.
    ///
    /// `poll_interval_ms` is only meaningful for [`WatchMode::Polling`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::PathNotFound`] if a path does not exist, or
    /// [`Error::WatchFailed`] if the native backend rejects the path.
    pub fn init(paths: &[PathBuf], mode: WatchMode, poll_interval_ms: u64) -> Result<Self> {
        let (tx, rx) = unbounded_channel();
        let backend = match mode {
            WatchMode::Native => Backend::Native(NativeBackend::start(paths, tx)?),
            WatchMode::Polling => {
                Backend::Polling(PollingBackend::start(paths, poll_interval_ms, tx)?)
            }
        };
        Ok(Self {
            _backend: backend,
            rx,
        })
    }

    /// Blocks until at least one watched path changes, returning a single
    /// debounced event (spec §4.F).
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelClosed`] if the backend's event source died
    /// (e.g. the native watcher's internal thread panicked).
    pub async fn wait_for_change(&mut self) -> Result<ChangeEvent> {
        let first = self.rx.recv().await.ok_or(Error::ChannelClosed)?;
        let mut event = ChangeEvent::new(first);

        loop {
            match tokio::time::timeout(DEBOUNCE, self.rx.recv()).await {
                Ok(Some(path)) => event.push(path),
                Ok(None) => return Err(Error::ChannelClosed),
                Err(_elapsed) => return Ok(event),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn polling_backend_detects_a_new_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut watcher =
            Watcher::init(&[dir.path().to_path_buf()], WatchMode::Polling, 20).unwrap();

        let file_path = dir.path().join("new.txt");
        let write_path = file_path.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(40)).await;
            std::fs::write(write_path, b"hello").unwrap();
        });

        let event = tokio::time::timeout(Duration::from_secs(5), watcher.wait_for_change())
            .await
            .expect("timed out waiting for change")
            .expect("watcher error");
        assert_eq!(event.path, file_path);
    }

    #[tokio::test]
    async fn init_rejects_missing_path() {
        let missing = PathBuf::from("/path/does/not/exist-zr-watcher-test");
        let err = Watcher::init(&[missing.clone()], WatchMode::Polling, 50).unwrap_err();
        assert!(matches!(err, Error::PathNotFound { path } if path == missing));
    }

    #[tokio::test]
    async fn debounces_rapid_successive_changes_into_one_event() {
        let dir = tempfile::tempdir().unwrap();
        let mut watcher =
            Watcher::init(&[dir.path().to_path_buf()], WatchMode::Polling, 20).unwrap();

        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        std::fs::write(&a, b"1").unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        std::fs::write(&b, b"2").unwrap();

        let event = tokio::time::timeout(Duration::from_secs(5), watcher.wait_for_change())
            .await
            .expect("timed out waiting for change")
            .expect("watcher error");
        let mut all = vec![event.path.clone()];
        all.extend(event.additional_paths.iter().cloned());
        assert!(all.contains(&a) || all.contains(&b));
    }
}

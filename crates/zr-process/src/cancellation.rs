//! A caller-observable cancellation flag (spec §4.D: "honors
//! `cancellation_handle`: a caller-observable flag").
//!
//! Grounded on the fan-out design in spec §5 ("a cancellation handle held by
//! the scheduler run fans out to per-task handles"): this is the per-task
//! leaf a `zr-scheduler` run-level handle derives. `zr-scheduler` owns the
//! fan-out; this type is just the primitive a single [`crate::run`] waits on.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// A clonable handle that can be activated once, waking anyone awaiting
/// [`CancellationHandle::cancelled`].
#[derive(Debug, Clone, Default)]
pub struct CancellationHandle {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    flag: AtomicBool,
    notify: Notify,
}

impl CancellationHandle {
    /// Creates a fresh, not-yet-cancelled handle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks this handle (and every clone of it) cancelled, waking all
    /// current and future waiters.
    pub fn cancel(&self) {
        self.inner.flag.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    /// True once `cancel` has been called on this handle or a clone.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.flag.load(Ordering::SeqCst)
    }

    /// Resolves once the handle is cancelled. Resolves immediately if it
    /// already was.
    pub async fn cancelled(&self) {
        if self.is_cancelled() {
            return;
        }
        // `notify_waiters` only wakes tasks already polling `notified()`, so
        // re-check after registering interest to close the race against a
        // `cancel()` that landed between the check above and this call.
        let notified = self.inner.notify.notified();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cancel_wakes_waiters() {
        let handle = CancellationHandle::new();
        let waiter = handle.clone();
        let task = tokio::spawn(async move {
            waiter.cancelled().await;
        });
        assert!(!handle.is_cancelled());
        handle.cancel();
        task.await.unwrap();
        assert!(handle.is_cancelled());
    }

    #[tokio::test]
    async fn already_cancelled_resolves_immediately() {
        let handle = CancellationHandle::new();
        handle.cancel();
        handle.cancelled().await;
    }
}

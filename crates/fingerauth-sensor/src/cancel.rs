//! Cooperative cancellation for a single hardware read.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

/// A one-shot "stop listening" flag shared between a [`SensorSession`]
/// and the hardware read it started.
///
/// Cancelling only signals intent: the hardware stops when it gets around
/// to it, and may still report an error afterwards. Nobody waits for it.
///
/// Clones share the same flag.
///
/// [`SensorSession`]: crate::SensorSession
#[derive(Debug, Clone, Default)]
pub struct CancellationSignal {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancellationSignal {
    /// Creates a fresh, un-cancelled signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent: only the first call wakes
    /// waiters.
    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::AcqRel) {
            self.inner.notify.notify_waiters();
        }
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called on any
    /// clone.
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Resolves once the signal is cancelled. Returns immediately if it
    /// already is.
    pub async fn cancelled(&self) {
        loop {
            // Register before checking the flag so a `cancel` landing
            // between the check and the await still wakes us.
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_cancel_is_idempotent_and_shared_by_clones() {
        let signal = CancellationSignal::new();
        let clone = signal.clone();
        assert!(!clone.is_cancelled());

        signal.cancel();
        signal.cancel();

        assert!(clone.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_returns_immediately_when_already_cancelled() {
        let signal = CancellationSignal::new();
        signal.cancel();
        tokio::time::timeout(Duration::from_millis(100), signal.cancelled())
            .await
            .expect("should resolve right away");
    }

    #[tokio::test]
    async fn test_cancelled_wakes_waiting_task() {
        let signal = CancellationSignal::new();
        let waiter = {
            let signal = signal.clone();
            tokio::spawn(async move { signal.cancelled().await })
        };
        tokio::task::yield_now().await;

        signal.cancel();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should wake")
            .expect("task should not panic");
    }
}

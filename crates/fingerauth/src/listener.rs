//! Turns the controller's callback seam into a future.

use fingerauth_protocol::{AuthError, AuthOutcome};
use fingerauth_session::AuthListener;
use tokio::sync::oneshot;

/// An [`AuthListener`] that forwards the outcome over a oneshot channel.
///
/// If the controller drops it without a call, the receiver sees the
/// channel close.
pub(crate) struct OneshotListener {
    tx: oneshot::Sender<AuthOutcome>,
}

impl OneshotListener {
    pub(crate) fn channel() -> (Box<Self>, oneshot::Receiver<AuthOutcome>) {
        let (tx, rx) = oneshot::channel();
        (Box::new(Self { tx }), rx)
    }

    fn deliver(self, outcome: AuthOutcome) {
        // The caller may have stopped waiting.
        if let Err(outcome) = self.tx.send(outcome) {
            tracing::debug!(?outcome, "outcome receiver gone");
        }
    }
}

impl AuthListener for OneshotListener {
    fn on_authenticated(self: Box<Self>) {
        self.deliver(AuthOutcome::Authenticated);
    }

    fn on_error(self: Box<Self>, error: AuthError) {
        self.deliver(AuthOutcome::Failed(error));
    }

    fn on_cancelled(self: Box<Self>) {
        self.deliver(AuthOutcome::Cancelled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_on_error_forwards_failed_outcome() {
        let (listener, mut rx) = OneshotListener::channel();
        listener.on_error(AuthError::NotEnrolled);
        assert_eq!(
            rx.try_recv().unwrap(),
            AuthOutcome::Failed(AuthError::NotEnrolled)
        );
    }

    #[test]
    fn test_dropped_listener_closes_channel() {
        let (listener, mut rx) = OneshotListener::channel();
        drop(listener);
        assert!(matches!(
            rx.try_recv(),
            Err(oneshot::error::TryRecvError::Closed)
        ));
    }
}

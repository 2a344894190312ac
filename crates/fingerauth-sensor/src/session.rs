//! One biometric engagement at a time.
//!
//! A [`SensorSession`] is created for an attempt, started whenever the
//! prompt becomes visible, cancelled when it stops being visible or the
//! attempt ends, and dropped with the attempt.
//!
//! # Engagement states
//!
//! ```text
//!            start()                 cancel() / success
//!   Idle ──────────────→ Listening ─────────────────────→ SelfCancelled
//!    ↑                      │                                  │
//!    └──── fatal error ─────┘         start() (fresh id) ──────┘
//! ```
//!
//! `SelfCancelled` is what suppresses the error a platform emits in
//! response to our own cancel. The state is switched *before* the
//! cancellation signal fires, so there is no window where the error can
//! arrive while we still look like we're listening.

use std::sync::Arc;

use fingerauth_protocol::AuthError;
use tokio::sync::mpsc;

use crate::{
    BiometricSensor, CancellationSignal, CryptoGuard, EngagementId, SensorCallbacks, SensorError,
    SensorSignal, SignalKind,
};

/// A hardware signal, interpreted.
///
/// Exactly one of these comes out of [`SensorSession::interpret`] for
/// every signal that still matters; stale and self-provoked ones produce
/// nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SensorEvent {
    /// Finger not recognized. The read continues.
    RecoverableFailure,
    /// The read ended with an error the caller should hear about.
    Fatal {
        error: AuthError,
        code: i32,
        message: String,
    },
    /// Finger recognized. The read is over.
    Success,
}

#[derive(Debug)]
enum Engagement {
    Idle,
    Listening {
        id: EngagementId,
        cancel: CancellationSignal,
    },
    SelfCancelled {
        id: EngagementId,
    },
}

/// Drives one sensor through start/cancel cycles and interprets what it
/// reports.
///
/// Not thread-safe, and not meant to be: it lives inside the controller's
/// task. Hardware callbacks reach it only through the signal channel.
pub struct SensorSession<S: BiometricSensor> {
    sensor: Arc<S>,
    signals: mpsc::UnboundedSender<SensorSignal>,
    engagement: Engagement,
}

impl<S: BiometricSensor> SensorSession<S> {
    /// Creates an idle session. Signals from reads it starts are sent to
    /// `signals`.
    pub fn new(sensor: Arc<S>, signals: mpsc::UnboundedSender<SensorSignal>) -> Self {
        Self {
            sensor,
            signals,
            engagement: Engagement::Idle,
        }
    }

    /// Starts a read with a fresh cancellation signal and engagement ID.
    ///
    /// Starting while a read is already listening is a bug in the caller;
    /// debug builds panic, release builds cancel the old read first so it
    /// can't leak.
    ///
    /// # Errors
    /// Returns the sensor's [`SensorError`] if the read couldn't start. The
    /// session is back to idle in that case.
    pub fn start(&mut self, guard: &CryptoGuard) -> Result<EngagementId, SensorError> {
        debug_assert!(
            !self.is_listening(),
            "sensor session started twice without a terminal event"
        );
        if self.is_listening() {
            self.cancel();
        }

        let id = EngagementId::next();
        let cancel = CancellationSignal::new();
        let callbacks = SensorCallbacks::new(id, self.signals.clone());

        self.engagement = Engagement::Listening {
            id,
            cancel: cancel.clone(),
        };

        if let Err(err) = self.sensor.authenticate(guard, cancel.clone(), callbacks) {
            tracing::debug!(engagement = %id, error = %err, "sensor refused to start");
            self.engagement = Engagement::Idle;
            cancel.cancel();
            return Err(err);
        }

        tracing::debug!(engagement = %id, key_alias = guard.key_alias(), "sensor listening");
        Ok(id)
    }

    /// Stops the current read, if any. Idempotent.
    pub fn cancel(&mut self) {
        let Engagement::Listening { id, .. } = self.engagement else {
            return;
        };
        // State first, then the signal: see the module docs.
        let previous = std::mem::replace(&mut self.engagement, Engagement::SelfCancelled { id });
        if let Engagement::Listening { cancel, .. } = previous {
            cancel.cancel();
        }
        tracing::debug!(engagement = %id, "sensor read cancelled");
    }

    /// Turns a raw signal into an event, or `None` if it should be
    /// ignored.
    pub fn interpret(&mut self, signal: SensorSignal) -> Option<SensorEvent> {
        let Some(current) = self.engagement_id() else {
            tracing::trace!(engagement = %signal.engagement, "signal with no read running, dropping");
            return None;
        };
        if signal.engagement != current {
            tracing::trace!(
                engagement = %signal.engagement,
                %current,
                "stale signal, dropping"
            );
            return None;
        }

        // Past this point the signal is ours, and we are either still
        // listening or have cancelled the read ourselves.
        let listening = self.is_listening();
        match signal.kind {
            SignalKind::Failed if listening => Some(SensorEvent::RecoverableFailure),
            SignalKind::Error { code, message } if listening => {
                // The platform ended the read itself; nothing to cancel.
                self.engagement = Engagement::Idle;
                Some(SensorEvent::Fatal {
                    error: AuthError::from_sensor_code(code),
                    code,
                    message,
                })
            }
            SignalKind::Succeeded if listening => {
                self.cancel();
                Some(SensorEvent::Success)
            }
            SignalKind::Error { code, .. } => {
                tracing::debug!(engagement = %current, code, "suppressing error after self-cancel");
                None
            }
            kind => {
                tracing::trace!(engagement = %current, ?kind, "signal after self-cancel, dropping");
                None
            }
        }
    }

    /// Returns `true` while a read is running.
    pub fn is_listening(&self) -> bool {
        matches!(self.engagement, Engagement::Listening { .. })
    }

    /// Returns `true` if the last read was ended by us.
    pub fn is_self_cancelled(&self) -> bool {
        matches!(self.engagement, Engagement::SelfCancelled { .. })
    }

    /// The current (or last self-cancelled) read, if any.
    pub fn engagement_id(&self) -> Option<EngagementId> {
        match self.engagement {
            Engagement::Idle => None,
            Engagement::Listening { id, .. } | Engagement::SelfCancelled { id } => Some(id),
        }
    }
}

impl<S: BiometricSensor> Drop for SensorSession<S> {
    fn drop(&mut self) {
        if self.is_listening() {
            self.cancel();
        }
    }
}

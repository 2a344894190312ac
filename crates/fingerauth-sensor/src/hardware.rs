//! The hardware seam: what a platform sensor implements, and how it
//! reports back.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use fingerauth_protocol::{Availability, HardwareStatus};
use tokio::sync::mpsc;

use crate::{CancellationSignal, CryptoGuard, SensorError};

/// Counter for engagement IDs. Process-wide so a signal from an old
/// session can never match a newer one.
static NEXT_ENGAGEMENT: AtomicU64 = AtomicU64::new(1);

/// Identifies one hardware read, from `start` until it ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EngagementId(u64);

impl EngagementId {
    pub(crate) fn next() -> Self {
        Self(NEXT_ENGAGEMENT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for EngagementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "eng-{}", self.0)
    }
}

/// What the hardware reported, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalKind {
    /// A finger was read but didn't match. The read continues.
    Failed,
    /// The read ended with an error. `code` is the platform's raw code.
    Error { code: i32, message: String },
    /// A finger matched. The read is over.
    Succeeded,
}

/// A hardware report tagged with the read it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorSignal {
    pub engagement: EngagementId,
    pub kind: SignalKind,
}

/// The callback sink handed to the hardware for one read.
///
/// Safe to call from any thread, any number of times; each call becomes a
/// [`SensorSignal`] on the session owner's channel. If the owner is gone
/// the signal is dropped.
#[derive(Debug, Clone)]
pub struct SensorCallbacks {
    engagement: EngagementId,
    tx: mpsc::UnboundedSender<SensorSignal>,
}

impl SensorCallbacks {
    pub(crate) fn new(engagement: EngagementId, tx: mpsc::UnboundedSender<SensorSignal>) -> Self {
        Self { engagement, tx }
    }

    /// The read these callbacks report for.
    pub fn engagement(&self) -> EngagementId {
        self.engagement
    }

    /// Finger read but not recognized.
    pub fn failed(&self) {
        self.send(SignalKind::Failed);
    }

    /// The read ended with a platform error.
    pub fn error(&self, code: i32, message: impl Into<String>) {
        self.send(SignalKind::Error {
            code,
            message: message.into(),
        });
    }

    /// Finger recognized.
    pub fn succeeded(&self) {
        self.send(SignalKind::Succeeded);
    }

    fn send(&self, kind: SignalKind) {
        let signal = SensorSignal {
            engagement: self.engagement,
            kind,
        };
        if self.tx.send(signal).is_err() {
            tracing::trace!(engagement = %self.engagement, "signal receiver gone, dropping");
        }
    }
}

/// A platform's biometric sensor.
///
/// # Trait bounds
///
/// `Send + Sync + 'static` because the sensor is shared (`Arc`) between the
/// facade, which answers availability queries directly, and the session
/// that drives reads.
pub trait BiometricSensor: Send + Sync + 'static {
    /// Raw capability snapshot. Must be cheap and side-effect free.
    fn status(&self) -> HardwareStatus;

    /// Classified availability. Override only if the platform knows better
    /// than [`Availability::from_status`].
    fn availability(&self) -> Availability {
        Availability::from_status(self.status())
    }

    /// Starts one read.
    ///
    /// Must return promptly: the read itself runs elsewhere and reports
    /// through `callbacks`. The implementation should stop reading once
    /// `cancel` fires; it may still report an error afterwards, which the
    /// session will swallow.
    ///
    /// # Errors
    /// Returns [`SensorError`] if the read could not be started at all.
    fn authenticate(
        &self,
        guard: &CryptoGuard,
        cancel: CancellationSignal,
        callbacks: SensorCallbacks,
    ) -> Result<(), SensorError>;
}

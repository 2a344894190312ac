//! Biometric sensor engagement for fingerauth.
//!
//! This crate owns everything between the state machine and the hardware:
//!
//! 1. **Precondition**: a [`CryptoGuard`] must exist before the sensor is
//!    engaged ([`CryptoGuardProvider`]).
//! 2. **Hardware seam**: [`BiometricSensor`] is what a platform implements;
//!    it reports status and starts a read.
//! 3. **Engagement**: [`SensorSession`] starts and cancels reads and turns
//!    raw hardware signals into [`SensorEvent`]s, swallowing the errors its
//!    own cancellation provokes.
//!
//! Hardware callbacks can fire on any thread. They never touch session
//! state directly: [`SensorCallbacks`] pushes tagged [`SensorSignal`]s into
//! a channel, and whoever owns the session feeds them back through
//! [`SensorSession::interpret`] on its own task.

mod cancel;
mod error;
mod guard;
mod hardware;
mod session;

pub use cancel::CancellationSignal;
pub use error::SensorError;
pub use guard::{CryptoGuard, CryptoGuardProvider};
pub use hardware::{BiometricSensor, EngagementId, SensorCallbacks, SensorSignal, SignalKind};
pub use session::{SensorEvent, SensorSession};

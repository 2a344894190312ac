//! The authentication error taxonomy and terminal outcomes.

use serde::{Deserialize, Serialize};

/// Code reported by the bridge when the sensor is usable.
///
/// It is not an error, so it has no [`AuthError`] variant; it only exists
/// so callers comparing raw codes see the same numbers as before.
pub const IS_SUPPORTED: i32 = 100;

/// Every way an attempt (or an availability check) can fail.
///
/// The set is closed: lower-level codes that don't map onto one of these
/// collapse into [`AuthError::NotSupported`] instead of leaking out raw.
///
/// The `#[error]` strings are the caller-facing messages and are part of
/// the bridge contract. Don't reword them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error,
)]
pub enum AuthError {
    /// The platform has no biometric API at all, or something unexpected
    /// happened that we can't classify.
    #[error("Not supported")]
    NotSupported,

    /// No biometric hardware on this device.
    #[error("Not present")]
    NotPresent,

    /// Hardware exists but can't be used right now (no secure lock screen,
    /// sensor busy, locked out after too many attempts).
    #[error("Not available")]
    NotAvailable,

    /// Hardware exists but the user never enrolled a fingerprint.
    #[error("Not enrolled")]
    NotEnrolled,

    /// The finger wasn't recognized. This is the only recoverable
    /// outcome: the sensor keeps listening and the user may try again.
    #[error("Not recognized. Try again.")]
    AuthenticationFailed,

    /// The attempt was cancelled (by the user, or by the platform on the
    /// user's behalf).
    #[error("Authentication cancelled")]
    AuthenticationCancelled,
}

impl AuthError {
    /// Numeric code handed to the bridge alongside the message.
    pub const fn code(self) -> i32 {
        match self {
            Self::NotSupported => 101,
            Self::NotPresent => 102,
            Self::NotAvailable => 103,
            Self::NotEnrolled => 104,
            Self::AuthenticationFailed => 105,
            Self::AuthenticationCancelled => 106,
        }
    }

    /// Maps a bridge code back to an outcome. Unknown codes (including
    /// [`IS_SUPPORTED`]) become [`AuthError::NotSupported`].
    pub const fn from_code(code: i32) -> Self {
        match code {
            102 => Self::NotPresent,
            103 => Self::NotAvailable,
            104 => Self::NotEnrolled,
            105 => Self::AuthenticationFailed,
            106 => Self::AuthenticationCancelled,
            _ => Self::NotSupported,
        }
    }

    /// Maps a raw error code reported by the sensor hardware.
    ///
    /// The numbers are the platform fingerprint manager's error constants.
    /// Anything we don't recognize (vendor codes, timeouts, "unable to
    /// process") is reported as [`AuthError::NotSupported`].
    pub const fn from_sensor_code(raw: i32) -> Self {
        match raw {
            // hardware unavailable, lockout, permanent lockout
            1 | 7 | 9 => Self::NotAvailable,
            // cancelled by the platform, cancelled by the user
            5 | 10 => Self::AuthenticationCancelled,
            11 => Self::NotEnrolled,
            12 => Self::NotPresent,
            _ => Self::NotSupported,
        }
    }

    /// `true` only for [`AuthError::AuthenticationFailed`]. Every other
    /// outcome ends the attempt.
    pub const fn is_recoverable(self) -> bool {
        matches!(self, Self::AuthenticationFailed)
    }
}

// ---------------------------------------------------------------------------
// AuthOutcome
// ---------------------------------------------------------------------------

/// The single terminal result of an accepted `authenticate` call.
///
/// On the wire it's a tagged object, e.g.
/// `{"status":"error","message":"Not enrolled","code":104}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    /// The user was verified (by the sensor or by the device credential).
    Authenticated,
    /// The attempt ended with a terminal error.
    Failed(AuthError),
    /// The user dismissed the prompt.
    Cancelled,
}

impl AuthOutcome {
    /// Returns `true` for [`AuthOutcome::Authenticated`].
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated)
    }
}

/// Wire shape of an [`AuthOutcome`]. Kept private so the enum stays the
/// only way to build one.
#[derive(Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum OutcomeReport {
    Authenticated,
    Error { message: String, code: i32 },
    Cancelled,
}

impl Serialize for AuthOutcome {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let report = match self {
            Self::Authenticated => OutcomeReport::Authenticated,
            Self::Failed(err) => OutcomeReport::Error {
                message: err.to_string(),
                code: err.code(),
            },
            Self::Cancelled => OutcomeReport::Cancelled,
        };
        report.serialize(serializer)
    }
}

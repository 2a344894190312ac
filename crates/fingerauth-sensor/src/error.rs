//! Error types for the sensor layer.

use fingerauth_protocol::AuthError;

/// Errors a [`BiometricSensor`](crate::BiometricSensor) can return when
/// asked to start a read.
///
/// Once a read is running, failures arrive as signals instead; this type
/// only covers the synchronous "couldn't even start" case.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SensorError {
    /// The hardware refused the request. `code` is the platform's raw
    /// error code.
    #[error("sensor rejected the request ({code}): {message}")]
    Rejected { code: i32, message: String },

    /// The sensor service went away (driver crash, service restart).
    #[error("sensor service disconnected")]
    Disconnected,
}

impl SensorError {
    /// The outcome a caller should see for this failure.
    pub fn as_auth_error(&self) -> AuthError {
        match self {
            Self::Rejected { code, .. } => AuthError::from_sensor_code(*code),
            Self::Disconnected => AuthError::NotAvailable,
        }
    }
}

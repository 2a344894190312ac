//! Seam to the OS device-credential (PIN/pattern/password) screen.

/// What the controller asks the credential flow to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRequest {
    /// Echoed back with the result; see
    /// [`ControllerConfig::fallback_request_code`](crate::ControllerConfig::fallback_request_code).
    pub request_code: i32,
    pub title: String,
    pub description: String,
}

/// What happened when the flow was asked to launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// The screen is up. Its result arrives later as a
    /// [`CredentialOutcome`].
    Launched,
    /// The device has no lock screen, so there is nothing to confirm.
    /// Counts as success.
    NoLockScreen,
    /// The platform has no credential service to launch.
    Unavailable,
}

/// Result reported by the credential screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialOutcome {
    Confirmed,
    Cancelled,
}

/// Launches the OS credential confirmation.
pub trait DeviceCredentialFlow: Send + 'static {
    /// Must not block waiting for the user.
    fn launch(&mut self, request: &CredentialRequest) -> LaunchOutcome;
}

//! Error types for the session layer.

/// Errors from talking to a running controller.
///
/// Authentication outcomes are not errors at this level; they go to the
/// attempt's [`AuthListener`](crate::AuthListener).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControllerError {
    /// The controller task has stopped (shut down or panicked), so the
    /// event could not be delivered.
    #[error("session controller is not running")]
    Unavailable,
}

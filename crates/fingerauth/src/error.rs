//! Unified error type for the fingerauth facade.

use fingerauth_protocol::ProtocolError;
use fingerauth_session::ControllerError;

/// Top-level error for [`FingerprintAuth`](crate::FingerprintAuth).
///
/// Authentication outcomes (not recognized, cancelled, no sensor...) are
/// *not* errors here: they come back as
/// [`AuthOutcome`](fingerauth_protocol::AuthOutcome). This type covers
/// the cases where no outcome could be produced at all.
#[derive(Debug, thiserror::Error)]
pub enum FingerauthError {
    /// The bridge payload couldn't be decoded or encoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The controller task is gone.
    #[error(transparent)]
    Controller(#[from] ControllerError),

    /// The request was not accepted: another attempt is in progress, or
    /// the app is not in the foreground.
    #[error("authentication request dropped: another attempt is in progress or the app is in the background")]
    RequestDropped,

    /// The request was accepted, then torn down without an outcome because
    /// the app went to the background or the host was destroyed.
    #[error("authentication abandoned before it finished")]
    Abandoned,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidConfig("expected a map, got null".into());
        let fingerauth_err: FingerauthError = err.into();
        assert!(matches!(fingerauth_err, FingerauthError::Protocol(_)));
        assert!(fingerauth_err.to_string().contains("expected a map"));
    }

    #[test]
    fn test_from_controller_error() {
        let fingerauth_err: FingerauthError = ControllerError::Unavailable.into();
        assert!(matches!(fingerauth_err, FingerauthError::Controller(_)));
        assert_eq!(
            fingerauth_err.to_string(),
            "session controller is not running"
        );
    }
}

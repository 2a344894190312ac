//! Error types for the protocol layer.

/// Errors raised while moving configs and outcomes across the bridge.
///
/// These are transport-shaped failures (bad JSON, unserializable values).
/// Authentication outcomes never show up here: those are [`AuthError`]
/// values and travel inside an [`AuthOutcome`].
///
/// [`AuthError`]: crate::AuthError
/// [`AuthOutcome`]: crate::AuthOutcome
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The caller's config map could not be decoded.
    ///
    /// Common causes: the payload is not a JSON object, or a key has the
    /// wrong type (`"passcodeFallback": "yes"`).
    #[cfg(feature = "json")]
    #[error("config decode failed: {0}")]
    Decode(serde_json::Error),

    /// An outcome could not be encoded for the bridge.
    #[cfg(feature = "json")]
    #[error("outcome encode failed: {0}")]
    Encode(serde_json::Error),

    /// The payload decoded, but not into something that can be a config.
    /// The bridge always sends a map; anything else is a caller bug.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

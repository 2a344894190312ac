//! Codec trait and implementations for the bridge payloads.
//!
//! The caller's side of the bridge speaks in maps and plain values. A
//! [`BridgeCodec`] converts the incoming config map into an [`AuthConfig`]
//! and the terminal [`AuthOutcome`] back into bytes. The rest of the
//! workspace only ever sees the typed values.
//!
//! [`JsonCodec`] is the only implementation today.

use crate::{AuthConfig, AuthOutcome, ProtocolError};

/// Converts bridge payloads to and from typed values.
///
/// `Send + Sync + 'static` because the facade keeps one codec for its
/// whole lifetime and may be driven from any Tokio worker.
pub trait BridgeCodec: Send + Sync + 'static {
    /// Decodes a caller-supplied config map.
    ///
    /// # Errors
    /// - [`ProtocolError::InvalidConfig`] if the payload isn't a map.
    /// - [`ProtocolError::Decode`] if it's malformed or a key has the wrong
    ///   type.
    fn decode_config(&self, data: &[u8]) -> Result<AuthConfig, ProtocolError>;

    /// Encodes a terminal outcome for delivery to the caller.
    fn encode_outcome(&self, outcome: &AuthOutcome) -> Result<Vec<u8>, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`BridgeCodec`] for JSON payloads (via `serde_json`).
///
/// Behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use fingerauth_protocol::{BridgeCodec, JsonCodec};
///
/// let config = JsonCodec
///     .decode_config(br#"{"passcodeFallback": true, "title": "Unlock"}"#)
///     .unwrap();
///
/// assert!(config.passcode_fallback);
/// assert_eq!(config.title, "Unlock");
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl BridgeCodec for JsonCodec {
    fn decode_config(&self, data: &[u8]) -> Result<AuthConfig, ProtocolError> {
        // Go through `Value` first: serde happily builds a struct from a
        // JSON array (fields by position), which is never what the bridge
        // meant.
        let value: serde_json::Value =
            serde_json::from_slice(data).map_err(ProtocolError::Decode)?;
        if !value.is_object() {
            return Err(ProtocolError::InvalidConfig(format!(
                "expected a map, got {}",
                json_kind(&value)
            )));
        }
        serde_json::from_value(value).map_err(ProtocolError::Decode)
    }

    fn encode_outcome(&self, outcome: &AuthOutcome) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(outcome).map_err(ProtocolError::Encode)
    }
}

#[cfg(feature = "json")]
fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "a map",
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::AuthError;

    #[test]
    fn test_decode_config_ignores_unknown_keys() {
        let config = JsonCodec
            .decode_config(br#"{"title": "Hi", "unrelatedKey": [1, 2, 3]}"#)
            .expect("unknown keys are fine");
        assert_eq!(config.title, "Hi");
    }

    #[test]
    fn test_decode_config_rejects_array() {
        let result = JsonCodec.decode_config(br#"[true, "title"]"#);
        assert!(
            matches!(result, Err(ProtocolError::InvalidConfig(ref msg)) if msg.contains("array")),
            "got {result:?}"
        );
    }

    #[test]
    fn test_decode_config_wrong_type_is_decode_error() {
        let result = JsonCodec.decode_config(br#"{"passcodeFallback": "yes"}"#);
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_decode_config_oversized_color_is_decode_error() {
        let result = JsonCodec.decode_config(br#"{"imageErrorColor": 1099511627775}"#);
        assert!(
            matches!(result, Err(ProtocolError::Decode(ref err)) if err.to_string().contains("32 bits")),
            "got {result:?}"
        );
    }

    #[test]
    fn test_decode_config_malformed_is_decode_error() {
        let result = JsonCodec.decode_config(b"{not json");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_encode_outcome_cancelled() {
        let bytes = JsonCodec
            .encode_outcome(&AuthOutcome::Cancelled)
            .expect("encodable");
        assert_eq!(bytes, br#"{"status":"cancelled"}"#);

        let bytes = JsonCodec
            .encode_outcome(&AuthOutcome::Failed(AuthError::AuthenticationCancelled))
            .expect("encodable");
        let text = String::from_utf8(bytes).expect("utf-8");
        assert!(text.contains(r#""code":106"#));
    }
}

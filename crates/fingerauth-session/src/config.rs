//! Controller configuration and the attempt phases.

// ---------------------------------------------------------------------------
// ControllerConfig
// ---------------------------------------------------------------------------

/// Settings for a [`SessionController`](crate::SessionController).
///
/// Per-request options live in `AuthConfig`; this is the process-wide part.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Request code the device-credential flow is launched with. Results
    /// carrying any other code belong to someone else and are ignored.
    ///
    /// Default: 10.
    pub fallback_request_code: i32,

    /// Capacity of the controller task's command channel. Senders wait
    /// when it is full.
    ///
    /// Default: 64.
    pub command_channel_size: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            fallback_request_code: 10,
            command_channel_size: 64,
        }
    }
}

// ---------------------------------------------------------------------------
// AppVisibility
// ---------------------------------------------------------------------------

/// Whether the host app is in front of the user.
///
/// Starts as `Background`: nothing is accepted until the host reports its
/// first resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppVisibility {
    Foreground,
    #[default]
    Background,
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Where a running attempt is.
///
/// ```text
///   Presenting ⟷ SensorActive
///        │            │
///        └─(fallback)─┴──→ Fallback
/// ```
///
/// - **Presenting**: the prompt was asked to show; the sensor is idle
///   until the presenter reports it visible.
/// - **SensorActive**: the prompt is visible and a read is running.
/// - **Fallback**: the OS credential screen is up; we wait for its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Presenting,
    SensorActive,
    Fallback,
}

impl Phase {
    /// Returns `true` while our prompt is (or is about to be) on screen.
    pub fn has_prompt(self) -> bool {
        matches!(self, Self::Presenting | Self::SensorActive)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Presenting => write!(f, "Presenting"),
            Self::SensorActive => write!(f, "SensorActive"),
            Self::Fallback => write!(f, "Fallback"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_controller_config_default() {
        let config = ControllerConfig::default();
        assert_eq!(config.fallback_request_code, 10);
        assert_eq!(config.command_channel_size, 64);
    }

    #[test]
    fn test_visibility_defaults_to_background() {
        assert_eq!(AppVisibility::default(), AppVisibility::Background);
    }

    #[test]
    fn test_phase_has_prompt() {
        assert!(Phase::Presenting.has_prompt());
        assert!(Phase::SensorActive.has_prompt());
        assert!(!Phase::Fallback.has_prompt());
        assert_eq!(Phase::SensorActive.to_string(), "SensorActive");
    }
}

//! Whether the biometric sensor can be used right now.

use crate::{AuthError, IS_SUPPORTED};

/// A raw snapshot of what the platform reports about its biometric
/// hardware. Producing it is the hardware layer's job; turning it into an
/// [`Availability`] is ours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HardwareStatus {
    /// The OS exposes a biometric API at all (old platform versions don't).
    pub api_available: bool,
    /// A fingerprint sensor was detected.
    pub hardware_detected: bool,
    /// The device is protected by a PIN, pattern or password.
    pub device_secure: bool,
    /// At least one fingerprint is enrolled.
    pub has_enrolled_templates: bool,
}

impl HardwareStatus {
    /// Status of a device where everything is in place.
    pub const fn ready() -> Self {
        Self {
            api_available: true,
            hardware_detected: true,
            device_secure: true,
            has_enrolled_templates: true,
        }
    }
}

/// Result of the capability probe.
///
/// ```text
/// no API ─────────────→ NotSupported
/// no sensor ──────────→ NotPresent
/// no secure lock ─────→ NotAvailable
/// nothing enrolled ───→ NotEnrolled
/// otherwise ──────────→ Supported
/// ```
///
/// The checks run in that order, so a device with no sensor AND no lock
/// screen reports `NotPresent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Availability {
    Supported,
    NotSupported,
    NotPresent,
    NotAvailable,
    NotEnrolled,
}

impl Availability {
    /// Classifies a hardware snapshot.
    pub const fn from_status(status: HardwareStatus) -> Self {
        if !status.api_available {
            Self::NotSupported
        } else if !status.hardware_detected {
            Self::NotPresent
        } else if !status.device_secure {
            Self::NotAvailable
        } else if !status.has_enrolled_templates {
            Self::NotEnrolled
        } else {
            Self::Supported
        }
    }

    /// Returns `true` if the sensor path can be used.
    pub const fn is_supported(self) -> bool {
        matches!(self, Self::Supported)
    }

    /// Returns `true` if there is no fingerprint hardware to drive: no
    /// sensor, or no biometric API to reach one through.
    pub const fn lacks_hardware(self) -> bool {
        matches!(self, Self::NotPresent | Self::NotSupported)
    }

    /// The error a caller sees when the sensor can't be used, or `None`
    /// when it can.
    pub const fn as_error(self) -> Option<AuthError> {
        match self {
            Self::Supported => None,
            Self::NotSupported => Some(AuthError::NotSupported),
            Self::NotPresent => Some(AuthError::NotPresent),
            Self::NotAvailable => Some(AuthError::NotAvailable),
            Self::NotEnrolled => Some(AuthError::NotEnrolled),
        }
    }

    /// Bridge code: [`IS_SUPPORTED`] or the matching error code.
    pub const fn code(self) -> i32 {
        match self.as_error() {
            Some(err) => err.code(),
            None => IS_SUPPORTED,
        }
    }
}

impl From<HardwareStatus> for Availability {
    fn from(status: HardwareStatus) -> Self {
        Self::from_status(status)
    }
}

impl std::fmt::Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.as_error() {
            Some(err) => write!(f, "{err}"),
            None => write!(f, "Is supported"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_ready_is_supported() {
        let availability = Availability::from_status(HardwareStatus::ready());
        assert_eq!(availability, Availability::Supported);
        assert!(availability.is_supported());
        assert_eq!(availability.code(), IS_SUPPORTED);
        assert_eq!(availability.as_error(), None);
    }

    #[test]
    fn test_from_status_checks_run_in_order() {
        // No sensor and no lock screen: the sensor check wins.
        let status = HardwareStatus {
            hardware_detected: false,
            device_secure: false,
            ..HardwareStatus::ready()
        };
        assert_eq!(Availability::from_status(status), Availability::NotPresent);

        let status = HardwareStatus {
            device_secure: false,
            has_enrolled_templates: false,
            ..HardwareStatus::ready()
        };
        assert_eq!(Availability::from_status(status), Availability::NotAvailable);

        let status = HardwareStatus {
            has_enrolled_templates: false,
            ..HardwareStatus::ready()
        };
        assert_eq!(Availability::from_status(status), Availability::NotEnrolled);
    }

    #[test]
    fn test_from_status_missing_api_is_not_supported() {
        let status = HardwareStatus {
            api_available: false,
            ..HardwareStatus::ready()
        };
        let availability: Availability = status.into();
        assert_eq!(availability, Availability::NotSupported);
        assert_eq!(availability.code(), 101);
    }

    #[test]
    fn test_as_error_maps_each_unusable_state() {
        assert_eq!(
            Availability::NotPresent.as_error(),
            Some(AuthError::NotPresent)
        );
        assert_eq!(
            Availability::NotEnrolled.as_error(),
            Some(AuthError::NotEnrolled)
        );
        assert_eq!(Availability::NotEnrolled.to_string(), "Not enrolled");
        assert_eq!(Availability::Supported.to_string(), "Is supported");
    }

    #[test]
    fn test_lacks_hardware_only_without_sensor_or_api() {
        assert!(Availability::NotPresent.lacks_hardware());
        assert!(Availability::NotSupported.lacks_hardware());
        assert!(!Availability::NotEnrolled.lacks_hardware());
        assert!(!Availability::NotAvailable.lacks_hardware());
        assert!(!Availability::Supported.lacks_hardware());
    }
}

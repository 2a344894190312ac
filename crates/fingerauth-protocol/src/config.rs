//! Per-request prompt configuration.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// A 32-bit ARGB color, used to tint the fingerprint image on the prompt.
///
/// The JS bridge hands colors over as signed 32-bit integers, so opaque
/// colors usually arrive negative (`-16777216` is opaque black). Decoding
/// goes through `i64` and accepts anything in `i32::MIN..=u32::MAX`, so
/// both sign conventions give back the same ARGB value. Wider values are
/// rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct Color(u32);

impl Color {
    /// Opaque black, the default image tint.
    pub const BLACK: Color = Color(0xFF00_0000);
    /// Opaque red, the default tint after a failed read.
    pub const RED: Color = Color(0xFFFF_0000);

    /// Builds a color from a packed `0xAARRGGBB` value.
    pub const fn from_argb(argb: u32) -> Self {
        Self(argb)
    }

    /// The packed `0xAARRGGBB` value.
    pub const fn argb(self) -> u32 {
        self.0
    }

    /// The alpha channel.
    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }
}

/// A color value that fits neither a signed nor an unsigned 32-bit int.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("color {0} does not fit in 32 bits")]
pub struct ColorOutOfRange(pub i64);

impl TryFrom<i64> for Color {
    type Error = ColorOutOfRange;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        if let Ok(argb) = u32::try_from(raw) {
            return Ok(Self(argb));
        }
        match i32::try_from(raw) {
            // Same bits, read as unsigned.
            Ok(signed) => Ok(Self(signed as u32)),
            Err(_) => Err(ColorOutOfRange(raw)),
        }
    }
}

impl From<Color> for u32 {
    fn from(color: Color) -> Self {
        color.0
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:08X}", self.0)
    }
}

// ---------------------------------------------------------------------------
// AuthConfig
// ---------------------------------------------------------------------------

/// Options the caller passes with each `authenticate` request.
///
/// Every key is optional on the wire (`#[serde(default)]` fills the gaps
/// from [`AuthConfig::default`]) and keys use the bridge's camelCase
/// spelling. Unknown keys are ignored so newer callers don't break older
/// builds.
///
/// Once an attempt starts, its config is frozen: the controller keeps its
/// own copy and never reads the caller's again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthConfig {
    /// Offer the device PIN/pattern/password as an alternative, and use it
    /// automatically when there is no sensor hardware or no crypto guard.
    pub passcode_fallback: bool,

    /// Prompt title.
    pub title: String,

    /// Label of the cancel button.
    pub cancel_text: String,

    /// Label of the fallback button (only shown with `passcode_fallback`).
    pub fallback_label: String,

    /// Text shown under the fingerprint image while waiting.
    pub sensor_description: String,

    /// Text shown after a failed read. Falls back to `sensor_description`
    /// when unset; use [`AuthConfig::sensor_error_description`] to read it.
    pub sensor_error_description: Option<String>,

    /// Image tint while waiting.
    pub image_color: Color,

    /// Image tint after a failed read.
    pub image_error_color: Color,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            passcode_fallback: false,
            title: String::new(),
            cancel_text: String::new(),
            fallback_label: String::new(),
            sensor_description: String::new(),
            sensor_error_description: None,
            image_color: Color::BLACK,
            image_error_color: Color::RED,
        }
    }
}

impl AuthConfig {
    /// The text to show after a failed read, with the default applied.
    pub fn sensor_error_description(&self) -> &str {
        self.sensor_error_description
            .as_deref()
            .unwrap_or(&self.sensor_description)
    }

    /// Shorthand for a config that only toggles the fallback.
    pub fn with_fallback(passcode_fallback: bool) -> Self {
        Self {
            passcode_fallback,
            ..Self::default()
        }
    }
}

//! # fingerauth
//!
//! Fingerprint authentication sessions with device-credential fallback.
//!
//! An app asks "is this user present?" and gets back exactly one answer.
//! In between, fingerauth checks that the sensor can be used, acquires the
//! crypto guard, drives the prompt and the sensor, falls back to the
//! device PIN/pattern/password when asked to, and makes sure only one
//! attempt runs at a time.
//!
//! You bring four things:
//!
//! - a [`BiometricSensor`]: the hardware,
//! - a [`CryptoGuardProvider`]: the keystore-backed precondition,
//! - a [`PromptPresenter`]: the UI,
//! - a [`DeviceCredentialFlow`]: the OS credential screen.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fingerauth::prelude::*;
//!
//! // let auth = FingerprintAuth::builder()
//! //     .build(sensor, guards, presenter, credentials);
//! //
//! // auth.on_foreground().await?;
//! // match auth.authenticate("Confirm payment", AuthConfig::default()).await? {
//! //     AuthOutcome::Authenticated => { /* proceed */ }
//! //     AuthOutcome::Failed(err) => eprintln!("{err} ({})", err.code()),
//! //     AuthOutcome::Cancelled => {}
//! // }
//! ```

mod auth;
mod error;
mod listener;

pub use auth::{FingerprintAuth, FingerprintAuthBuilder};
pub use error::FingerauthError;

pub use fingerauth_protocol::{
    AuthConfig, AuthError, AuthOutcome, Availability, BridgeCodec, Color, HardwareStatus,
    JsonCodec, ProtocolError, IS_SUPPORTED,
};
pub use fingerauth_sensor::{
    BiometricSensor, CancellationSignal, CryptoGuard, CryptoGuardProvider, EngagementId,
    SensorCallbacks, SensorError,
};
pub use fingerauth_session::{
    AppVisibility, AttemptState, ControllerConfig, ControllerError, ControllerStatus,
    CredentialOutcome, CredentialRequest, DeviceCredentialFlow, FailureNotice, LaunchOutcome,
    Phase, Prompt, PromptPresenter,
};

/// Everything needed to embed fingerauth, in one import.
pub mod prelude {
    pub use crate::{
        AuthConfig, AuthError, AuthOutcome, Availability, BiometricSensor, CancellationSignal,
        Color, ControllerConfig, CredentialOutcome, CredentialRequest, CryptoGuard,
        CryptoGuardProvider, DeviceCredentialFlow, FailureNotice, FingerauthError,
        FingerprintAuth, HardwareStatus, LaunchOutcome, Prompt, PromptPresenter,
        SensorCallbacks, SensorError,
    };
}

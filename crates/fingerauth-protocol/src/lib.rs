//! Shared vocabulary for fingerauth.
//!
//! This crate defines the data every other layer speaks:
//!
//! - **Outcomes** ([`AuthError`], [`AuthOutcome`]): the closed error
//!   taxonomy and the single terminal result of an attempt.
//! - **Availability** ([`Availability`], [`HardwareStatus`]): whether the
//!   biometric sensor can be used right now, and why not.
//! - **Configuration** ([`AuthConfig`], [`Color`]): the per-request prompt
//!   options supplied by the caller.
//! - **Codec** ([`BridgeCodec`], [`JsonCodec`]): how configs arrive from
//!   the bridge and how outcomes leave it.
//!
//! # How it fits in the stack
//!
//! ```text
//! Facade (fingerauth)            ← exposes is_supported / authenticate
//!     ↕
//! Session layer                  ← the attempt state machine
//!     ↕
//! Sensor layer                   ← one hardware engagement at a time
//!     ↕
//! Protocol layer (this crate)    ← outcomes, availability, config
//! ```
//!
//! Nothing in here has side effects.

mod availability;
mod codec;
mod config;
mod error;
mod outcome;

pub use availability::{Availability, HardwareStatus};
pub use codec::BridgeCodec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use config::{AuthConfig, Color, ColorOutOfRange};
pub use error::ProtocolError;
pub use outcome::{AuthError, AuthOutcome, IS_SUPPORTED};

//! The authentication session controller.
//!
//! One attempt at a time runs through a single state machine that owns
//! the sensor session, asks for the crypto guard, decides when to fall
//! back to the device credential, and reports exactly one outcome.
//!
//! # Key types
//!
//! - [`SessionController`]: the state machine itself. Plain struct, one
//!   owner, every transition is a `&mut self` method.
//! - [`ControllerHandle`]: send events to a controller running as a Tokio
//!   task ([`spawn_controller`]). Hardware callbacks, UI events and
//!   lifecycle changes from any thread are serialized through it.
//! - [`AttemptGate`]: the "attempt in progress" flag. Held by the running
//!   attempt as an [`AttemptPermit`]; dropping the attempt releases it.
//! - [`PromptPresenter`], [`AuthListener`], [`DeviceCredentialFlow`]: the
//!   seams to the UI, the caller and the OS credential screen.
//!
//! # Attempt lifecycle
//!
//! ```text
//!              authenticate
//!   Idle ─────────────────────→ Validating ──(fallback)──→ Fallback ──┐
//!    ↑                              │                                  │
//!    │                              ▼           shown                  │
//!    │                         Presenting ←──────────→ SensorActive    │
//!    │                              │          hidden        │         │
//!    │                              └──── cancel / error / success ────┤
//!    └──────────────────────────────────────────────────────────────────┘
//! ```

mod actor;
mod config;
mod controller;
mod credential;
mod error;
mod gate;
mod presenter;

pub use actor::{spawn_controller, ControllerHandle, ControllerStatus};
pub use config::{AppVisibility, ControllerConfig, Phase};
pub use controller::{AttemptId, SessionController};
pub use credential::{CredentialOutcome, CredentialRequest, DeviceCredentialFlow, LaunchOutcome};
pub use error::ControllerError;
pub use gate::{AttemptGate, AttemptPermit, AttemptState};
pub use presenter::{AuthListener, FailureNotice, Prompt, PromptPresenter};

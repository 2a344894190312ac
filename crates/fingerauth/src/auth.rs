//! `FingerprintAuth` builder and the caller-facing API.
//!
//! This is the entry point for embedding fingerauth. It ties the layers
//! together: codec → controller task → sensor session.

use std::sync::Arc;

use fingerauth_protocol::{
    AuthConfig, AuthError, AuthOutcome, Availability, BridgeCodec, JsonCodec,
};
use fingerauth_sensor::{BiometricSensor, CryptoGuardProvider};
use fingerauth_session::{
    spawn_controller, ControllerConfig, ControllerHandle, ControllerStatus, CredentialOutcome,
    DeviceCredentialFlow, PromptPresenter, SessionController,
};

use crate::listener::OneshotListener;
use crate::FingerauthError;

/// Builder for configuring and starting a [`FingerprintAuth`].
///
/// # Example
///
/// ```rust,ignore
/// use fingerauth::prelude::*;
///
/// let auth = FingerprintAuth::builder()
///     .controller_config(ControllerConfig::default())
///     .build(sensor, guards, presenter, credentials);
///
/// auth.on_foreground().await?;
/// let outcome = auth.authenticate("Confirm payment", AuthConfig::default()).await?;
/// ```
pub struct FingerprintAuthBuilder<C: BridgeCodec = JsonCodec> {
    controller_config: ControllerConfig,
    codec: C,
}

impl FingerprintAuthBuilder {
    /// Creates a new builder with default settings and the JSON codec.
    pub fn new() -> Self {
        Self {
            controller_config: ControllerConfig::default(),
            codec: JsonCodec,
        }
    }
}

impl Default for FingerprintAuthBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: BridgeCodec> FingerprintAuthBuilder<C> {
    /// Sets the controller configuration.
    pub fn controller_config(mut self, config: ControllerConfig) -> Self {
        self.controller_config = config;
        self
    }

    /// Replaces the bridge codec.
    pub fn codec<C2: BridgeCodec>(self, codec: C2) -> FingerprintAuthBuilder<C2> {
        FingerprintAuthBuilder {
            controller_config: self.controller_config,
            codec,
        }
    }

    /// Spawns the controller task and returns the facade.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime.
    pub fn build<S, G, P, D>(
        self,
        sensor: Arc<S>,
        guards: G,
        presenter: P,
        credentials: D,
    ) -> FingerprintAuth<C>
    where
        S: BiometricSensor,
        G: CryptoGuardProvider,
        P: PromptPresenter,
        D: DeviceCredentialFlow,
    {
        let probe: Arc<dyn BiometricSensor> = sensor.clone();
        let (controller, signals) = SessionController::new(
            self.controller_config,
            sensor,
            guards,
            presenter,
            credentials,
        );
        let controller = spawn_controller(controller, signals);

        FingerprintAuth {
            sensor: probe,
            controller,
            codec: self.codec,
        }
    }
}

/// A running fingerprint authentication service.
///
/// Cheap to share behind an `Arc`; every method takes `&self`. The
/// presenter, the host lifecycle and the credential screen report back
/// through the event methods, from any task.
pub struct FingerprintAuth<C: BridgeCodec = JsonCodec> {
    /// Shared with the controller; queried directly for availability.
    sensor: Arc<dyn BiometricSensor>,
    controller: ControllerHandle,
    codec: C,
}

impl FingerprintAuth {
    /// Creates a new builder.
    pub fn builder() -> FingerprintAuthBuilder {
        FingerprintAuthBuilder::new()
    }
}

impl<C: BridgeCodec> FingerprintAuth<C> {
    // =====================================================================
    // Caller API
    // =====================================================================

    /// Whether the sensor can be used right now.
    ///
    /// A pure query: doesn't touch the running attempt, if any, and
    /// ignores the in-progress gate.
    pub fn is_supported(&self) -> Result<(), AuthError> {
        match self.availability().as_error() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// The full availability classification.
    pub fn availability(&self) -> Availability {
        self.sensor.availability()
    }

    /// Runs one attempt and waits for its outcome.
    ///
    /// # Errors
    /// - [`FingerauthError::RequestDropped`] if another attempt is running
    ///   or the app isn't in the foreground.
    /// - [`FingerauthError::Abandoned`] if the app was backgrounded or the
    ///   host destroyed before the attempt finished.
    /// - [`FingerauthError::Controller`] if the controller task is gone.
    pub async fn authenticate(
        &self,
        reason: impl Into<String>,
        config: AuthConfig,
    ) -> Result<AuthOutcome, FingerauthError> {
        let (listener, outcome) = OneshotListener::channel();
        let accepted = self
            .controller
            .authenticate(reason, config, listener)
            .await?;
        if !accepted {
            return Err(FingerauthError::RequestDropped);
        }
        outcome.await.map_err(|_| FingerauthError::Abandoned)
    }

    /// Like [`authenticate`](Self::authenticate), with the config given as
    /// a bridge payload.
    ///
    /// # Errors
    /// [`FingerauthError::Protocol`] if the payload doesn't decode; nothing
    /// is started in that case.
    pub async fn authenticate_with_json(
        &self,
        reason: impl Into<String>,
        config: &[u8],
    ) -> Result<AuthOutcome, FingerauthError> {
        let config = self.codec.decode_config(config)?;
        self.authenticate(reason, config).await
    }

    /// Encodes an outcome for the bridge.
    pub fn encode_outcome(&self, outcome: &AuthOutcome) -> Result<Vec<u8>, FingerauthError> {
        Ok(self.codec.encode_outcome(outcome)?)
    }

    // =====================================================================
    // Host lifecycle
    // =====================================================================

    pub async fn on_foreground(&self) -> Result<(), FingerauthError> {
        Ok(self.controller.foreground().await?)
    }

    pub async fn on_background(&self) -> Result<(), FingerauthError> {
        Ok(self.controller.background().await?)
    }

    pub async fn on_destroyed(&self) -> Result<(), FingerauthError> {
        Ok(self.controller.destroyed().await?)
    }

    // =====================================================================
    // Presenter events
    // =====================================================================

    /// The prompt became visible.
    pub async fn prompt_shown(&self) -> Result<(), FingerauthError> {
        Ok(self.controller.prompt_shown().await?)
    }

    /// The prompt lost visibility without being dismissed.
    pub async fn prompt_hidden(&self) -> Result<(), FingerauthError> {
        Ok(self.controller.prompt_hidden().await?)
    }

    pub async fn user_cancelled(&self) -> Result<(), FingerauthError> {
        Ok(self.controller.user_cancelled().await?)
    }

    pub async fn user_fallback(&self) -> Result<(), FingerauthError> {
        Ok(self.controller.user_fallback().await?)
    }

    // =====================================================================
    // Device credential
    // =====================================================================

    /// Forwards a result from the OS credential screen.
    pub async fn on_credential_result(
        &self,
        request_code: i32,
        outcome: CredentialOutcome,
    ) -> Result<(), FingerauthError> {
        Ok(self
            .controller
            .credential_result(request_code, outcome)
            .await?)
    }

    // =====================================================================
    // Introspection / teardown
    // =====================================================================

    /// Whether an attempt is running.
    pub fn is_in_progress(&self) -> bool {
        self.controller.is_in_progress()
    }

    /// A snapshot of the controller's state.
    pub async fn status(&self) -> Result<ControllerStatus, FingerauthError> {
        Ok(self.controller.status().await?)
    }

    /// Stops the controller task. A running attempt is abandoned.
    pub async fn shutdown(&self) -> Result<(), FingerauthError> {
        tracing::info!("fingerauth shutting down");
        Ok(self.controller.shutdown().await?)
    }
}

//! Controller actor: the session controller running in its own Tokio task.
//!
//! UI events, lifecycle changes, credential results and hardware callbacks
//! can come from anywhere. The actor is the one place they are applied,
//! one at a time, in arrival order. Commands come in on a bounded mpsc
//! channel; sensor signals on the controller's own unbounded channel.

use fingerauth_protocol::AuthConfig;
use fingerauth_sensor::{BiometricSensor, CryptoGuardProvider, SensorSignal};
use tokio::sync::{mpsc, oneshot};

use crate::{
    AppVisibility, AttemptGate, AttemptState, AuthListener, ControllerError, CredentialOutcome,
    DeviceCredentialFlow, Phase, PromptPresenter, SessionController,
};

/// Commands sent to the controller task through its channel.
pub(crate) enum ControllerCommand {
    /// Start an attempt. The reply says whether it was accepted.
    Authenticate {
        reason: String,
        config: AuthConfig,
        listener: Box<dyn AuthListener>,
        reply: oneshot::Sender<bool>,
    },

    PromptShown,
    PromptHidden,
    UserCancelled,
    UserFallback,

    Foreground,
    Background,
    Destroyed,

    CredentialResult {
        request_code: i32,
        outcome: CredentialOutcome,
    },

    /// Request a status snapshot.
    GetStatus {
        reply: oneshot::Sender<ControllerStatus>,
    },

    /// Tear down any attempt and stop the task.
    Shutdown,
}

/// A snapshot of the controller's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerStatus {
    pub attempt: AttemptState,
    /// Phase of the running attempt; `None` when idle.
    pub phase: Option<Phase>,
    pub visibility: AppVisibility,
}

/// Handle to a running controller task.
///
/// Cheap to clone. Every method fails with
/// [`ControllerError::Unavailable`] once the task has stopped.
#[derive(Clone)]
pub struct ControllerHandle {
    sender: mpsc::Sender<ControllerCommand>,
    gate: AttemptGate,
}

impl ControllerHandle {
    /// Asks the controller to start an attempt.
    ///
    /// Returns `Ok(false)` if the request was dropped (busy or not in the
    /// foreground); `listener` is then dropped without a call.
    pub async fn authenticate(
        &self,
        reason: impl Into<String>,
        config: AuthConfig,
        listener: Box<dyn AuthListener>,
    ) -> Result<bool, ControllerError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(ControllerCommand::Authenticate {
            reason: reason.into(),
            config,
            listener,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| ControllerError::Unavailable)
    }

    pub async fn prompt_shown(&self) -> Result<(), ControllerError> {
        self.send(ControllerCommand::PromptShown).await
    }

    pub async fn prompt_hidden(&self) -> Result<(), ControllerError> {
        self.send(ControllerCommand::PromptHidden).await
    }

    pub async fn user_cancelled(&self) -> Result<(), ControllerError> {
        self.send(ControllerCommand::UserCancelled).await
    }

    pub async fn user_fallback(&self) -> Result<(), ControllerError> {
        self.send(ControllerCommand::UserFallback).await
    }

    pub async fn foreground(&self) -> Result<(), ControllerError> {
        self.send(ControllerCommand::Foreground).await
    }

    pub async fn background(&self) -> Result<(), ControllerError> {
        self.send(ControllerCommand::Background).await
    }

    pub async fn destroyed(&self) -> Result<(), ControllerError> {
        self.send(ControllerCommand::Destroyed).await
    }

    /// Forwards a result from the device-credential screen.
    pub async fn credential_result(
        &self,
        request_code: i32,
        outcome: CredentialOutcome,
    ) -> Result<(), ControllerError> {
        self.send(ControllerCommand::CredentialResult {
            request_code,
            outcome,
        })
        .await
    }

    /// Requests a status snapshot.
    pub async fn status(&self) -> Result<ControllerStatus, ControllerError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(ControllerCommand::GetStatus { reply: reply_tx })
            .await?;
        reply_rx.await.map_err(|_| ControllerError::Unavailable)
    }

    /// Tells the controller to stop. Any running attempt is abandoned.
    pub async fn shutdown(&self) -> Result<(), ControllerError> {
        self.send(ControllerCommand::Shutdown).await
    }

    /// Whether an attempt is running, read straight off the gate.
    pub fn is_in_progress(&self) -> bool {
        !self.gate.is_idle()
    }

    async fn send(&self, command: ControllerCommand) -> Result<(), ControllerError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| ControllerError::Unavailable)
    }
}

/// The controller plus its two inboxes. Runs inside a Tokio task.
struct ControllerActor<S, G, P, D>
where
    S: BiometricSensor,
    G: CryptoGuardProvider,
    P: PromptPresenter,
    D: DeviceCredentialFlow,
{
    controller: SessionController<S, G, P, D>,
    commands: mpsc::Receiver<ControllerCommand>,
    signals: mpsc::UnboundedReceiver<SensorSignal>,
}

impl<S, G, P, D> ControllerActor<S, G, P, D>
where
    S: BiometricSensor,
    G: CryptoGuardProvider,
    P: PromptPresenter,
    D: DeviceCredentialFlow,
{
    async fn run(mut self) {
        tracing::info!("controller actor started");

        loop {
            tokio::select! {
                command = self.commands.recv() => {
                    let Some(command) = command else {
                        tracing::debug!("all handles dropped");
                        break;
                    };
                    if !self.handle(command) {
                        break;
                    }
                }
                // The controller holds a sender, so this never yields None.
                Some(signal) = self.signals.recv() => {
                    self.controller.on_sensor_signal(signal);
                }
            }
        }

        self.controller.on_destroyed();
        tracing::info!("controller actor stopped");
    }

    /// Applies one command. Returns `false` on shutdown.
    fn handle(&mut self, command: ControllerCommand) -> bool {
        let ctl = &mut self.controller;
        match command {
            ControllerCommand::Authenticate {
                reason,
                config,
                listener,
                reply,
            } => {
                let accepted = ctl.authenticate(reason, config, listener);
                let _ = reply.send(accepted);
            }
            ControllerCommand::PromptShown => ctl.on_prompt_shown(),
            ControllerCommand::PromptHidden => ctl.on_prompt_hidden(),
            ControllerCommand::UserCancelled => ctl.on_user_cancel(),
            ControllerCommand::UserFallback => ctl.on_user_fallback(),
            ControllerCommand::Foreground => ctl.on_foreground(),
            ControllerCommand::Background => ctl.on_background(),
            ControllerCommand::Destroyed => ctl.on_destroyed(),
            ControllerCommand::CredentialResult {
                request_code,
                outcome,
            } => ctl.on_credential_result(request_code, outcome),
            ControllerCommand::GetStatus { reply } => {
                let _ = reply.send(ControllerStatus {
                    attempt: ctl.attempt_state(),
                    phase: ctl.phase(),
                    visibility: ctl.visibility(),
                });
            }
            ControllerCommand::Shutdown => {
                tracing::info!("controller shutting down");
                return false;
            }
        }
        true
    }
}

/// Spawns the controller as a Tokio task and returns a handle to it.
///
/// `signals` is the receiver [`SessionController::new`] returned
/// alongside the controller. The command channel is bounded by
/// `ControllerConfig::command_channel_size`.
pub fn spawn_controller<S, G, P, D>(
    controller: SessionController<S, G, P, D>,
    signals: mpsc::UnboundedReceiver<SensorSignal>,
) -> ControllerHandle
where
    S: BiometricSensor,
    G: CryptoGuardProvider,
    P: PromptPresenter,
    D: DeviceCredentialFlow,
{
    let (tx, rx) = mpsc::channel(controller.config().command_channel_size.max(1));
    let gate = controller.gate();

    let actor = ControllerActor {
        controller,
        commands: rx,
        signals,
    };
    tokio::spawn(actor.run());

    ControllerHandle { sender: tx, gate }
}

//! The session controller: one attempt, start to finish.
//!
//! Every transition is a `&mut self` method, so the controller is
//! single-writer by construction. It is not thread-safe and doesn't try to
//! be; run it inside one task ([`spawn_controller`]) and send it events.
//!
//! # Concurrency guard
//!
//! The running attempt owns the [`AttemptPermit`]. Ending an attempt, on
//! any path, means taking it out of `self.attempt` and letting it drop,
//! which releases the permit. There is no flag to forget to reset.
//!
//! [`spawn_controller`]: crate::spawn_controller

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use fingerauth_protocol::{AuthConfig, AuthError};
use fingerauth_sensor::{
    BiometricSensor, CryptoGuard, CryptoGuardProvider, SensorEvent, SensorSession, SensorSignal,
};
use tokio::sync::mpsc;

use crate::{
    AppVisibility, AttemptGate, AttemptPermit, AttemptState, AuthListener, ControllerConfig,
    CredentialOutcome, CredentialRequest, DeviceCredentialFlow, FailureNotice, LaunchOutcome,
    Phase, Prompt, PromptPresenter,
};

/// Counter for attempt IDs (log correlation only).
static NEXT_ATTEMPT_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies one accepted `authenticate` call in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttemptId(u64);

impl AttemptId {
    fn next() -> Self {
        Self(NEXT_ATTEMPT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "attempt-{}", self.0)
    }
}

/// How an attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Terminal {
    Authenticated,
    Error(AuthError),
    Cancelled,
    /// Torn down without telling the caller (backgrounded, destroyed).
    Abandoned,
}

/// Everything that belongs to the one running attempt.
struct Attempt<S: BiometricSensor> {
    id: AttemptId,
    permit: AttemptPermit,
    reason: String,
    config: AuthConfig,
    listener: Box<dyn AuthListener>,
    phase: Phase,
    /// Present on the sensor path only. Lent to each read, dropped with
    /// the attempt.
    guard: Option<CryptoGuard>,
    session: Option<SensorSession<S>>,
}

impl<S: BiometricSensor> Attempt<S> {
    /// Releases everything, then tells the listener.
    ///
    /// The permit is released before the listener runs, so a caller that
    /// reacts to the outcome by asking again finds the gate open.
    fn finish(self, terminal: Terminal) {
        let Attempt {
            id,
            permit,
            listener,
            session,
            guard,
            phase,
            ..
        } = self;

        // Dropping a listening session cancels its read.
        drop(session);
        drop(guard);
        drop(permit);

        tracing::info!(attempt_id = %id, %phase, outcome = ?terminal, "attempt finished");

        match terminal {
            Terminal::Authenticated => listener.on_authenticated(),
            Terminal::Error(error) => listener.on_error(error),
            Terminal::Cancelled => listener.on_cancelled(),
            Terminal::Abandoned => drop(listener),
        }
    }
}

/// The authentication state machine.
///
/// Generic over its collaborators:
/// - `S`: the biometric hardware,
/// - `G`: where crypto guards come from,
/// - `P`: the prompt UI,
/// - `D`: the OS device-credential screen.
///
/// Hardware callbacks arrive as [`SensorSignal`]s on the receiver returned
/// by [`SessionController::new`]; the owner feeds them back through
/// [`on_sensor_signal`](Self::on_sensor_signal).
pub struct SessionController<S, G, P, D>
where
    S: BiometricSensor,
    G: CryptoGuardProvider,
    P: PromptPresenter,
    D: DeviceCredentialFlow,
{
    config: ControllerConfig,
    sensor: Arc<S>,
    guards: G,
    presenter: P,
    credentials: D,
    gate: AttemptGate,
    visibility: AppVisibility,
    signals: mpsc::UnboundedSender<SensorSignal>,
    attempt: Option<Attempt<S>>,
}

impl<S, G, P, D> SessionController<S, G, P, D>
where
    S: BiometricSensor,
    G: CryptoGuardProvider,
    P: PromptPresenter,
    D: DeviceCredentialFlow,
{
    /// Creates an idle controller, in the background until the host says
    /// otherwise.
    ///
    /// Returns the controller and the receiving end of its sensor signal
    /// channel.
    pub fn new(
        config: ControllerConfig,
        sensor: Arc<S>,
        guards: G,
        presenter: P,
        credentials: D,
    ) -> (Self, mpsc::UnboundedReceiver<SensorSignal>) {
        let (signals, signal_rx) = mpsc::unbounded_channel();
        let controller = Self {
            config,
            sensor,
            guards,
            presenter,
            credentials,
            gate: AttemptGate::new(),
            visibility: AppVisibility::default(),
            signals,
            attempt: None,
        };
        (controller, signal_rx)
    }

    // =====================================================================
    // Caller
    // =====================================================================

    /// Starts an attempt.
    ///
    /// Returns `false` if the request was dropped: another attempt is
    /// running, or the app isn't in the foreground. A dropped request's
    /// listener is dropped without any call.
    ///
    /// An accepted request goes one of four ways right away:
    /// - fallback enabled and no guard or no sensor hardware → device
    ///   credential, sensor never touched;
    /// - sensor unusable, no fallback → `on_error` with the availability
    ///   error;
    /// - no guard, no fallback → `on_error(NotSupported)`;
    /// - otherwise the prompt is shown and the sensor waits for it.
    pub fn authenticate(
        &mut self,
        reason: impl Into<String>,
        config: AuthConfig,
        listener: Box<dyn AuthListener>,
    ) -> bool {
        if self.visibility != AppVisibility::Foreground {
            tracing::debug!("authenticate dropped: app is not in the foreground");
            return false;
        }
        let Some(permit) = self.gate.try_acquire() else {
            tracing::debug!("authenticate dropped: an attempt is already in progress");
            return false;
        };

        let id = AttemptId::next();
        let availability = self.sensor.availability();
        // Never cached: a new guard for every attempt.
        let guard = self.guards.acquire();

        tracing::info!(
            attempt_id = %id,
            %availability,
            guard = guard.is_some(),
            fallback = config.passcode_fallback,
            "attempt started"
        );

        let mut attempt = Attempt {
            id,
            permit,
            reason: reason.into(),
            config,
            listener,
            phase: Phase::Presenting,
            guard: None,
            session: None,
        };

        let fallback = attempt.config.passcode_fallback;
        if fallback && (guard.is_none() || availability.lacks_hardware()) {
            attempt.phase = Phase::Fallback;
            self.attempt = Some(attempt);
            self.launch_credential_flow();
            return true;
        }

        if let Some(error) = availability.as_error().filter(|_| !fallback) {
            attempt.finish(Terminal::Error(error));
            return true;
        }

        let Some(guard) = guard else {
            attempt.finish(Terminal::Error(AuthError::NotSupported));
            return true;
        };

        attempt.guard = Some(guard);
        attempt.session = Some(SensorSession::new(
            Arc::clone(&self.sensor),
            self.signals.clone(),
        ));
        self.presenter
            .show(&Prompt::for_request(&attempt.reason, &attempt.config));
        self.attempt = Some(attempt);
        true
    }

    // =====================================================================
    // Presenter
    // =====================================================================

    /// The prompt is visible: start reading.
    ///
    /// Does nothing if a read is already running, so a re-shown prompt
    /// never double-starts the sensor.
    pub fn on_prompt_shown(&mut self) {
        let Some(attempt) = self.attempt.as_mut() else {
            tracing::trace!("prompt shown with no attempt, ignoring");
            return;
        };
        if attempt.phase != Phase::Presenting {
            tracing::debug!(attempt_id = %attempt.id, phase = %attempt.phase, "prompt shown, nothing to start");
            return;
        }
        let (Some(session), Some(guard)) = (attempt.session.as_mut(), attempt.guard.as_ref())
        else {
            return;
        };

        match session.start(guard) {
            Ok(engagement) => {
                attempt.phase = Phase::SensorActive;
                tracing::debug!(attempt_id = %attempt.id, %engagement, "sensor active");
            }
            Err(err) => {
                tracing::warn!(attempt_id = %attempt.id, error = %err, "sensor failed to start");
                let error = err.as_auth_error();
                self.terminate(Terminal::Error(error));
            }
        }
    }

    /// The prompt went out of view: stop reading, keep the attempt.
    ///
    /// A later [`on_prompt_shown`](Self::on_prompt_shown) starts a fresh
    /// read with the same guard.
    pub fn on_prompt_hidden(&mut self) {
        let Some(attempt) = self.attempt.as_mut() else {
            return;
        };
        if attempt.phase != Phase::SensorActive {
            return;
        }
        if let Some(session) = attempt.session.as_mut() {
            session.cancel();
        }
        attempt.phase = Phase::Presenting;
        tracing::debug!(attempt_id = %attempt.id, "prompt hidden, sensor paused");
    }

    /// The user tapped cancel.
    pub fn on_user_cancel(&mut self) {
        let Some(attempt) = self.attempt.as_mut() else {
            tracing::trace!("cancel tap with no attempt, ignoring");
            return;
        };
        if !attempt.phase.has_prompt() {
            tracing::warn!(attempt_id = %attempt.id, phase = %attempt.phase, "cancel tap without a prompt, ignoring");
            return;
        }
        if let Some(session) = attempt.session.as_mut() {
            session.cancel();
        }
        self.terminate(Terminal::Cancelled);
    }

    /// The user tapped the fallback button.
    ///
    /// Ignored unless the attempt was started with fallback enabled.
    pub fn on_user_fallback(&mut self) {
        let Some(attempt) = self.attempt.as_mut() else {
            tracing::trace!("fallback tap with no attempt, ignoring");
            return;
        };
        if !attempt.config.passcode_fallback {
            tracing::warn!(attempt_id = %attempt.id, "fallback tap but fallback is disabled, ignoring");
            return;
        }
        if !attempt.phase.has_prompt() {
            tracing::warn!(attempt_id = %attempt.id, phase = %attempt.phase, "fallback tap without a prompt, ignoring");
            return;
        }

        if let Some(session) = attempt.session.as_mut() {
            session.cancel();
        }
        attempt.session = None;
        attempt.guard = None;
        attempt.phase = Phase::Fallback;
        self.presenter.dismiss();
        self.launch_credential_flow();
    }

    // =====================================================================
    // Sensor
    // =====================================================================

    /// Handles one hardware signal (already marshalled onto our task).
    pub fn on_sensor_signal(&mut self, signal: SensorSignal) {
        let Some(attempt) = self.attempt.as_mut() else {
            tracing::trace!(engagement = %signal.engagement, "signal with no attempt, dropping");
            return;
        };
        let Some(session) = attempt.session.as_mut() else {
            tracing::trace!(engagement = %signal.engagement, "signal with no sensor session, dropping");
            return;
        };
        let Some(event) = session.interpret(signal) else {
            return;
        };

        match event {
            SensorEvent::RecoverableFailure => {
                tracing::debug!(attempt_id = %attempt.id, "finger not recognized");
                let notice = FailureNotice {
                    message: attempt.config.sensor_error_description().to_owned(),
                    image_tint: attempt.config.image_error_color,
                    error: AuthError::AuthenticationFailed,
                };
                self.presenter.show_failure(&notice);
            }
            SensorEvent::Fatal {
                error,
                code,
                message,
            } => {
                tracing::info!(attempt_id = %attempt.id, code, %message, %error, "sensor error");
                self.terminate(Terminal::Error(error));
            }
            SensorEvent::Success => {
                self.terminate(Terminal::Authenticated);
            }
        }
    }

    // =====================================================================
    // Device credential
    // =====================================================================

    /// The credential screen reported back.
    ///
    /// Results with a foreign request code, or with no fallback pending,
    /// are ignored.
    pub fn on_credential_result(&mut self, request_code: i32, outcome: CredentialOutcome) {
        if request_code != self.config.fallback_request_code {
            tracing::debug!(request_code, "result for another request code, ignoring");
            return;
        }
        match self.attempt.as_ref() {
            Some(attempt) if attempt.phase == Phase::Fallback => {}
            _ => {
                tracing::warn!(?outcome, "credential result with no fallback pending, ignoring");
                return;
            }
        }

        let terminal = match outcome {
            CredentialOutcome::Confirmed => Terminal::Authenticated,
            CredentialOutcome::Cancelled => Terminal::Error(AuthError::AuthenticationCancelled),
        };
        self.terminate(terminal);
    }

    // =====================================================================
    // Host lifecycle
    // =====================================================================

    /// The host app came to the front.
    pub fn on_foreground(&mut self) {
        self.visibility = AppVisibility::Foreground;
    }

    /// The host app went to the back.
    ///
    /// A prompt-phase attempt is torn down without a callback. A fallback
    /// attempt survives: the credential screen itself is what pushed us
    /// to the back.
    pub fn on_background(&mut self) {
        self.visibility = AppVisibility::Background;
        let Some(attempt) = self.attempt.as_mut() else {
            return;
        };
        if !attempt.phase.has_prompt() {
            return;
        }
        if let Some(session) = attempt.session.as_mut() {
            session.cancel();
        }
        self.terminate(Terminal::Abandoned);
    }

    /// The host is gone. Any attempt is torn down without a callback.
    pub fn on_destroyed(&mut self) {
        self.visibility = AppVisibility::Background;
        self.terminate(Terminal::Abandoned);
    }

    // =====================================================================
    // Queries
    // =====================================================================

    /// Whether an attempt holds the gate.
    pub fn attempt_state(&self) -> AttemptState {
        self.gate.state()
    }

    /// Phase of the running attempt, if any.
    pub fn phase(&self) -> Option<Phase> {
        self.attempt.as_ref().map(|attempt| attempt.phase)
    }

    /// Last reported host visibility.
    pub fn visibility(&self) -> AppVisibility {
        self.visibility
    }

    /// A shared view of the concurrency gate.
    pub fn gate(&self) -> AttemptGate {
        self.gate.clone()
    }

    /// The controller's settings.
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    // =====================================================================
    // Internals
    // =====================================================================

    /// Launches the credential screen for the running attempt, which must
    /// already be in [`Phase::Fallback`].
    fn launch_credential_flow(&mut self) {
        let Some(attempt) = self.attempt.as_ref() else {
            return;
        };
        let request = CredentialRequest {
            request_code: self.config.fallback_request_code,
            title: attempt.config.title.clone(),
            description: attempt.reason.clone(),
        };
        let id = attempt.id;

        match self.credentials.launch(&request) {
            LaunchOutcome::Launched => {
                tracing::info!(attempt_id = %id, request_code = request.request_code, "device credential launched");
            }
            LaunchOutcome::NoLockScreen => {
                tracing::info!(attempt_id = %id, "no lock screen, nothing to confirm");
                self.terminate(Terminal::Authenticated);
            }
            LaunchOutcome::Unavailable => {
                tracing::warn!(attempt_id = %id, "device credential flow unavailable");
                self.terminate(Terminal::Error(AuthError::NotAvailable));
            }
        }
    }

    /// Ends the running attempt, if any. The one exit path.
    fn terminate(&mut self, terminal: Terminal) {
        let Some(attempt) = self.attempt.take() else {
            return;
        };
        if attempt.phase.has_prompt() {
            self.presenter.dismiss();
        }
        attempt.finish(terminal);
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for the transitions that are awkward to reach through
    //! the public event API. The end-to-end scenarios live in
    //! `tests/controller.rs`.

    use std::sync::Mutex;

    use fingerauth_protocol::HardwareStatus;
    use fingerauth_sensor::{CancellationSignal, SensorCallbacks, SensorError};

    use super::*;

    struct Sensor {
        refuse: bool,
    }

    impl BiometricSensor for Sensor {
        fn status(&self) -> HardwareStatus {
            HardwareStatus::ready()
        }

        fn authenticate(
            &self,
            _guard: &CryptoGuard,
            _cancel: CancellationSignal,
            _callbacks: SensorCallbacks,
        ) -> Result<(), SensorError> {
            if self.refuse {
                Err(SensorError::Disconnected)
            } else {
                Ok(())
            }
        }
    }

    #[derive(Default)]
    struct Presenter {
        dismissed: usize,
    }

    impl PromptPresenter for Presenter {
        fn show(&mut self, _prompt: &Prompt) {}
        fn show_failure(&mut self, _notice: &FailureNotice) {}
        fn dismiss(&mut self) {
            self.dismissed += 1;
        }
    }

    struct Credentials;

    impl DeviceCredentialFlow for Credentials {
        fn launch(&mut self, _request: &CredentialRequest) -> LaunchOutcome {
            LaunchOutcome::Launched
        }
    }

    struct Listener(Arc<Mutex<Vec<String>>>);

    impl AuthListener for Listener {
        fn on_authenticated(self: Box<Self>) {
            self.0.lock().unwrap().push("authenticated".into());
        }
        fn on_error(self: Box<Self>, error: AuthError) {
            self.0.lock().unwrap().push(format!("error: {error}"));
        }
        fn on_cancelled(self: Box<Self>) {
            self.0.lock().unwrap().push("cancelled".into());
        }
    }

    type TestController =
        SessionController<Sensor, fn() -> Option<CryptoGuard>, Presenter, Credentials>;

    fn some_guard() -> Option<CryptoGuard> {
        Some(CryptoGuard::new("unit"))
    }

    fn controller(refuse: bool) -> TestController {
        let (mut controller, _signals) = SessionController::new(
            ControllerConfig::default(),
            Arc::new(Sensor { refuse }),
            some_guard as fn() -> Option<CryptoGuard>,
            Presenter::default(),
            Credentials,
        );
        controller.on_foreground();
        controller
    }

    #[test]
    fn test_on_prompt_shown_sensor_refuses_reports_error_and_releases() {
        let mut ctl = controller(true);
        let log = Arc::new(Mutex::new(Vec::new()));
        assert!(ctl.authenticate("r", AuthConfig::default(), Box::new(Listener(log.clone()))));

        ctl.on_prompt_shown();

        assert_eq!(*log.lock().unwrap(), vec!["error: Not available".to_string()]);
        assert_eq!(ctl.attempt_state(), AttemptState::Idle);
        assert_eq!(ctl.presenter.dismissed, 1);
    }

    #[test]
    fn test_on_credential_result_without_fallback_pending_is_ignored() {
        let mut ctl = controller(false);
        let log = Arc::new(Mutex::new(Vec::new()));
        ctl.authenticate("r", AuthConfig::default(), Box::new(Listener(log.clone())));

        ctl.on_credential_result(10, CredentialOutcome::Confirmed);

        assert!(log.lock().unwrap().is_empty());
        assert_eq!(ctl.phase(), Some(Phase::Presenting));
    }

    #[test]
    fn test_attempt_ids_increase() {
        let a = AttemptId::next();
        let b = AttemptId::next();
        assert!(b.0 > a.0);
        assert!(a.to_string().starts_with("attempt-"));
    }
}

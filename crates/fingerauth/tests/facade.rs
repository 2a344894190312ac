//! Integration tests for the `FingerprintAuth` facade, end to end.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use fingerauth::prelude::*;
use fingerauth::{AttemptState, ControllerError, Phase, ProtocolError};

// =========================================================================
// Mocks
// =========================================================================

struct MockSensor {
    status: HardwareStatus,
    reads: Mutex<Vec<(CancellationSignal, SensorCallbacks)>>,
}

impl MockSensor {
    fn new(status: HardwareStatus) -> Arc<Self> {
        Arc::new(Self {
            status,
            reads: Mutex::new(Vec::new()),
        })
    }

    fn callbacks(&self, index: usize) -> SensorCallbacks {
        self.reads.lock().unwrap()[index].1.clone()
    }
}

impl BiometricSensor for MockSensor {
    fn status(&self) -> HardwareStatus {
        self.status
    }

    fn authenticate(
        &self,
        _guard: &CryptoGuard,
        cancel: CancellationSignal,
        callbacks: SensorCallbacks,
    ) -> Result<(), SensorError> {
        self.reads.lock().unwrap().push((cancel, callbacks));
        Ok(())
    }
}

struct NullPresenter;

impl PromptPresenter for NullPresenter {
    fn show(&mut self, _prompt: &Prompt) {}
    fn show_failure(&mut self, _notice: &FailureNotice) {}
    fn dismiss(&mut self) {}
}

#[derive(Clone, Default)]
struct RecordingCredentials {
    requests: Arc<Mutex<Vec<CredentialRequest>>>,
}

impl DeviceCredentialFlow for RecordingCredentials {
    fn launch(&mut self, request: &CredentialRequest) -> LaunchOutcome {
        self.requests.lock().unwrap().push(request.clone());
        LaunchOutcome::Launched
    }
}

// =========================================================================
// Helpers
// =========================================================================

fn build(sensor: &Arc<MockSensor>, guard: bool) -> (Arc<FingerprintAuth>, RecordingCredentials) {
    let credentials = RecordingCredentials::default();
    let auth = FingerprintAuth::builder().build(
        Arc::clone(sensor),
        move || guard.then(|| CryptoGuard::new("facade-test")),
        NullPresenter,
        credentials.clone(),
    );
    (Arc::new(auth), credentials)
}

/// Waits until the controller has processed everything sent so far and
/// reports the given phase.
async fn wait_for_phase(auth: &FingerprintAuth, phase: Phase) {
    for _ in 0..100 {
        if auth.status().await.unwrap().phase == Some(phase) {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("controller never reached {phase}");
}

fn spawn_authenticate(
    auth: &Arc<FingerprintAuth>,
    config: AuthConfig,
) -> tokio::task::JoinHandle<Result<AuthOutcome, FingerauthError>> {
    let auth = Arc::clone(auth);
    tokio::spawn(async move { auth.authenticate("Confirm payment", config).await })
}

async fn join(
    task: tokio::task::JoinHandle<Result<AuthOutcome, FingerauthError>>,
) -> Result<AuthOutcome, FingerauthError> {
    tokio::time::timeout(Duration::from_secs(1), task)
        .await
        .expect("authenticate should finish")
        .expect("task should not panic")
}

// =========================================================================
// is_supported()
// =========================================================================

#[tokio::test]
async fn test_is_supported_ready_device_ok() {
    let sensor = MockSensor::new(HardwareStatus::ready());
    let (auth, _) = build(&sensor, true);

    assert_eq!(auth.is_supported(), Ok(()));
    assert_eq!(auth.availability().code(), fingerauth::IS_SUPPORTED);
}

#[tokio::test]
async fn test_is_supported_not_enrolled_returns_code_104() {
    let sensor = MockSensor::new(HardwareStatus {
        has_enrolled_templates: false,
        ..HardwareStatus::ready()
    });
    let (auth, _) = build(&sensor, true);

    let err = auth.is_supported().unwrap_err();
    assert_eq!(err, AuthError::NotEnrolled);
    assert_eq!(err.code(), 104);
}

#[tokio::test]
async fn test_is_supported_ignores_running_attempt() {
    let sensor = MockSensor::new(HardwareStatus::ready());
    let (auth, _) = build(&sensor, true);
    auth.on_foreground().await.unwrap();

    let _task = spawn_authenticate(&auth, AuthConfig::default());
    wait_for_phase(&auth, Phase::Presenting).await;

    assert!(auth.is_in_progress());
    assert_eq!(auth.is_supported(), Ok(()));
}

// =========================================================================
// authenticate()
// =========================================================================

#[tokio::test]
async fn test_authenticate_sensor_success() {
    let sensor = MockSensor::new(HardwareStatus::ready());
    let (auth, _) = build(&sensor, true);
    auth.on_foreground().await.unwrap();

    let task = spawn_authenticate(&auth, AuthConfig::default());
    wait_for_phase(&auth, Phase::Presenting).await;
    auth.prompt_shown().await.unwrap();
    wait_for_phase(&auth, Phase::SensorActive).await;

    let callbacks = sensor.callbacks(0);
    callbacks.failed();
    callbacks.succeeded();

    let outcome = join(task).await.unwrap();
    assert!(outcome.is_authenticated());
    assert_eq!(outcome, AuthOutcome::Authenticated);
    assert!(!auth.is_in_progress());
    assert_eq!(
        auth.status().await.unwrap().attempt,
        AttemptState::Idle
    );
}

#[tokio::test]
async fn test_authenticate_in_background_request_dropped() {
    let sensor = MockSensor::new(HardwareStatus::ready());
    let (auth, _) = build(&sensor, true);

    let result = auth.authenticate("x", AuthConfig::default()).await;

    assert!(matches!(result, Err(FingerauthError::RequestDropped)));
}

#[tokio::test]
async fn test_authenticate_while_busy_request_dropped() {
    let sensor = MockSensor::new(HardwareStatus::ready());
    let (auth, _) = build(&sensor, true);
    auth.on_foreground().await.unwrap();

    let first = spawn_authenticate(&auth, AuthConfig::default());
    wait_for_phase(&auth, Phase::Presenting).await;

    let second = auth.authenticate("again", AuthConfig::default()).await;
    assert!(matches!(second, Err(FingerauthError::RequestDropped)));

    auth.user_cancelled().await.unwrap();
    assert_eq!(join(first).await.unwrap(), AuthOutcome::Cancelled);
}

#[tokio::test]
async fn test_authenticate_without_guard_fails_not_supported() {
    let sensor = MockSensor::new(HardwareStatus::ready());
    let (auth, _) = build(&sensor, false);
    auth.on_foreground().await.unwrap();

    let outcome = auth
        .authenticate("x", AuthConfig::default())
        .await
        .unwrap();

    assert_eq!(outcome, AuthOutcome::Failed(AuthError::NotSupported));
}

#[tokio::test]
async fn test_authenticate_backgrounded_abandoned() {
    let sensor = MockSensor::new(HardwareStatus::ready());
    let (auth, _) = build(&sensor, true);
    auth.on_foreground().await.unwrap();

    let task = spawn_authenticate(&auth, AuthConfig::default());
    wait_for_phase(&auth, Phase::Presenting).await;
    auth.prompt_shown().await.unwrap();
    auth.on_background().await.unwrap();

    assert!(matches!(join(task).await, Err(FingerauthError::Abandoned)));
    assert!(!auth.is_in_progress());
}

// =========================================================================
// authenticate_with_json()
// =========================================================================

#[tokio::test]
async fn test_authenticate_with_json_invalid_payload_starts_nothing() {
    let sensor = MockSensor::new(HardwareStatus::ready());
    let (auth, _) = build(&sensor, true);
    auth.on_foreground().await.unwrap();

    let result = auth.authenticate_with_json("x", b"[1, 2]").await;

    assert!(matches!(
        result,
        Err(FingerauthError::Protocol(ProtocolError::InvalidConfig(_)))
    ));
    assert!(!auth.is_in_progress());
}

#[tokio::test]
async fn test_authenticate_with_json_fallback_confirmed() {
    let sensor = MockSensor::new(HardwareStatus::ready());
    let (auth, credentials) = build(&sensor, false);
    auth.on_foreground().await.unwrap();

    let task = {
        let auth = Arc::clone(&auth);
        tokio::spawn(async move {
            auth.authenticate_with_json(
                "Unlock vault",
                br#"{"passcodeFallback": true, "title": "Vault"}"#,
            )
            .await
        })
    };
    wait_for_phase(&auth, Phase::Fallback).await;

    {
        let requests = credentials.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].title, "Vault");
        assert_eq!(requests[0].description, "Unlock vault");
        assert_eq!(requests[0].request_code, 10);
    }

    auth.on_credential_result(10, CredentialOutcome::Confirmed)
        .await
        .unwrap();

    assert_eq!(join(task).await.unwrap(), AuthOutcome::Authenticated);
}

// =========================================================================
// Bridge encoding / teardown
// =========================================================================

#[tokio::test]
async fn test_encode_outcome_error_report() {
    let sensor = MockSensor::new(HardwareStatus::ready());
    let (auth, _) = build(&sensor, true);

    let bytes = auth
        .encode_outcome(&AuthOutcome::Failed(AuthError::AuthenticationCancelled))
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(
        json,
        serde_json::json!({
            "status": "error",
            "message": "Authentication cancelled",
            "code": 106
        })
    );

    let code = json["code"].as_i64().and_then(|code| i32::try_from(code).ok());
    assert_eq!(
        code.map(AuthError::from_code),
        Some(AuthError::AuthenticationCancelled)
    );
}

#[tokio::test]
async fn test_shutdown_then_authenticate_controller_error() {
    let sensor = MockSensor::new(HardwareStatus::ready());
    let (auth, _) = build(&sensor, true);
    auth.on_foreground().await.unwrap();

    auth.shutdown().await.unwrap();
    // Let the controller task run to completion.
    while auth.status().await.is_ok() {
        tokio::task::yield_now().await;
    }

    let result = auth.authenticate("x", AuthConfig::default()).await;
    assert!(matches!(
        result,
        Err(FingerauthError::Controller(ControllerError::Unavailable))
    ));
}

use std::sync::Arc;
use std::time::Duration;

use fingerauth::prelude::*;
use fingerauth::Phase;
use rand::Rng;
use tokio::task::JoinHandle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// ---------------------------------------------------------------------------
// Simulated hardware
// ---------------------------------------------------------------------------

/// Platform code the sensor reports when a read is cancelled.
const ERROR_CANCELED: i32 = 5;

/// A sensor that "reads" a finger every few hundred milliseconds and
/// recognizes it with probability `match_rate`.
struct SimulatedSensor {
    match_rate: f64,
}

impl BiometricSensor for SimulatedSensor {
    fn status(&self) -> HardwareStatus {
        HardwareStatus::ready()
    }

    fn authenticate(
        &self,
        guard: &CryptoGuard,
        cancel: CancellationSignal,
        callbacks: SensorCallbacks,
    ) -> Result<(), SensorError> {
        tracing::info!(key = guard.key_alias(), engagement = %callbacks.engagement(), "sensor listening");
        let match_rate = self.match_rate;

        tokio::spawn(async move {
            loop {
                let delay = rand::rng().random_range(150..450);
                tokio::select! {
                    _ = cancel.cancelled() => {
                        // Real hardware reports its own cancellation as an error.
                        callbacks.error(ERROR_CANCELED, "Fingerprint operation canceled.");
                        break;
                    }
                    _ = tokio::time::sleep(Duration::from_millis(delay)) => {
                        let recognized = rand::rng().random_bool(match_rate);
                        if recognized {
                            callbacks.succeeded();
                            break;
                        }
                        callbacks.failed();
                    }
                }
            }
        });
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Simulated UI and OS
// ---------------------------------------------------------------------------

struct ConsolePresenter;

impl PromptPresenter for ConsolePresenter {
    fn show(&mut self, prompt: &Prompt) {
        tracing::info!(
            title = %prompt.title,
            reason = %prompt.reason,
            tint = %prompt.image_tint,
            fallback = prompt.fallback_label.is_some(),
            "prompt shown"
        );
    }

    fn show_failure(&mut self, notice: &FailureNotice) {
        tracing::info!(message = %notice.message, tint = %notice.image_tint, "prompt: try again");
    }

    fn dismiss(&mut self) {
        tracing::info!("prompt dismissed");
    }
}

struct ConsoleCredentials;

impl DeviceCredentialFlow for ConsoleCredentials {
    fn launch(&mut self, request: &CredentialRequest) -> LaunchOutcome {
        tracing::info!(request_code = request.request_code, description = %request.description, "device credential screen up");
        LaunchOutcome::Launched
    }
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

type Attempt = JoinHandle<Result<AuthOutcome, FingerauthError>>;

/// Polls the controller until the attempt reaches `phase`, so the UI
/// events below land on the attempt they're meant for. Returns `false` if
/// the attempt finished first.
async fn wait_for_phase(
    auth: &FingerprintAuth,
    attempt: &Attempt,
    phase: Phase,
) -> Result<bool, FingerauthError> {
    loop {
        if attempt.is_finished() {
            return Ok(false);
        }
        if auth.status().await?.phase == Some(phase) {
            return Ok(true);
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

fn report(auth: &FingerprintAuth, outcome: &AuthOutcome) -> Result<(), FingerauthError> {
    if outcome.is_authenticated() {
        tracing::info!("user verified");
    } else {
        tracing::warn!(?outcome, "user not verified");
    }
    let bytes = auth.encode_outcome(outcome)?;
    println!("{}", String::from_utf8_lossy(&bytes));
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let auth = Arc::new(FingerprintAuth::builder().build(
        Arc::new(SimulatedSensor { match_rate: 0.35 }),
        || Some(CryptoGuard::new("simulated-sensor")),
        ConsolePresenter,
        ConsoleCredentials,
    ));

    match auth.is_supported() {
        Ok(()) => tracing::info!(code = fingerauth::IS_SUPPORTED, "sensor supported"),
        Err(err) => tracing::warn!(code = err.code(), %err, "sensor not supported"),
    }

    auth.on_foreground().await?;

    // Attempt 1: read until the finger is recognized.
    let attempt = {
        let auth = Arc::clone(&auth);
        tokio::spawn(async move {
            auth.authenticate("Confirm payment", AuthConfig::default())
                .await
        })
    };
    if wait_for_phase(&auth, &attempt, Phase::Presenting).await? {
        auth.prompt_shown().await?;
    }
    let outcome = attempt.await??;
    report(&auth, &outcome)?;

    // Attempt 2: the user gives up on the sensor and enters their PIN.
    let attempt = {
        let auth = Arc::clone(&auth);
        tokio::spawn(async move {
            auth.authenticate_with_json(
                "Unlock vault",
                br#"{"passcodeFallback": true, "title": "Vault", "fallbackLabel": "Use PIN"}"#,
            )
            .await
        })
    };
    if wait_for_phase(&auth, &attempt, Phase::Presenting).await? {
        auth.prompt_shown().await?;
    }
    // The sensor may recognize the finger before the user gives up on it.
    if wait_for_phase(&auth, &attempt, Phase::SensorActive).await? {
        auth.user_fallback().await?;
        // The credential screen pushes the app to the back, then returns.
        auth.on_background().await?;
        tokio::time::sleep(Duration::from_millis(300)).await;
        auth.on_foreground().await?;
        auth.on_credential_result(10, CredentialOutcome::Confirmed)
            .await?;
    }
    let outcome = attempt.await??;
    report(&auth, &outcome)?;

    auth.shutdown().await?;
    Ok(())
}

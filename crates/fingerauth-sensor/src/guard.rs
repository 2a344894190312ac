//! The cryptographic precondition for engaging the sensor.

/// Proof that the platform can back a biometric match with a key
/// operation right now.
///
/// What's inside is the platform's business; here it only has to exist.
/// It isn't `Clone`: the attempt that acquired it owns it, lends it to the
/// sensor for each read, and drops it when the attempt ends. A new attempt
/// has to acquire a new one.
#[derive(Debug)]
pub struct CryptoGuard {
    key_alias: String,
}

impl CryptoGuard {
    /// Wraps a guard produced for the given keystore alias.
    pub fn new(key_alias: impl Into<String>) -> Self {
        Self {
            key_alias: key_alias.into(),
        }
    }

    /// The keystore alias this guard was produced for. Diagnostics only.
    pub fn key_alias(&self) -> &str {
        &self.key_alias
    }
}

/// Produces a [`CryptoGuard`], or reports that none can be made.
///
/// `None` is an ordinary answer, not a failure: it typically means the
/// backing key was invalidated (new fingerprint enrolled, lock screen
/// removed). Implementations must not cache guards across calls.
///
/// Plain closures work too:
///
/// ```rust
/// use fingerauth_sensor::{CryptoGuard, CryptoGuardProvider};
///
/// let provider = || Some(CryptoGuard::new("login"));
/// assert_eq!(provider.acquire().unwrap().key_alias(), "login");
/// ```
pub trait CryptoGuardProvider: Send + Sync + 'static {
    /// Tries to produce a guard for one attempt.
    fn acquire(&self) -> Option<CryptoGuard>;
}

impl<F> CryptoGuardProvider for F
where
    F: Fn() -> Option<CryptoGuard> + Send + Sync + 'static,
{
    fn acquire(&self) -> Option<CryptoGuard> {
        self()
    }
}

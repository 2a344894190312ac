//! The single in-flight attempt guard.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Whether an attempt currently holds the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    Idle,
    Authenticating,
}

/// Hands out at most one [`AttemptPermit`] at a time.
///
/// The controller owns the gate; clones share the same flag, so the
/// facade can keep one to answer "is something running?" without a round
/// trip through the controller task. Only the controller acquires.
#[derive(Debug, Clone, Default)]
pub struct AttemptGate {
    in_progress: Arc<AtomicBool>,
}

impl AttemptGate {
    /// Creates an open gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the permit if nobody holds it.
    ///
    /// Returns `None` while another permit is alive.
    pub fn try_acquire(&self) -> Option<AttemptPermit> {
        self.in_progress
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| AttemptPermit {
                in_progress: Arc::clone(&self.in_progress),
            })
    }

    /// Current state of the gate.
    pub fn state(&self) -> AttemptState {
        if self.in_progress.load(Ordering::Acquire) {
            AttemptState::Authenticating
        } else {
            AttemptState::Idle
        }
    }

    /// Returns `true` if no attempt holds the permit.
    pub fn is_idle(&self) -> bool {
        self.state() == AttemptState::Idle
    }
}

/// Proof that the holder is the one running attempt.
///
/// Not `Clone`. Dropping it reopens the gate, which is the only way the
/// gate ever reopens: every path that ends an attempt ends by dropping
/// the attempt, and the permit with it.
#[derive(Debug)]
pub struct AttemptPermit {
    in_progress: Arc<AtomicBool>,
}

impl Drop for AttemptPermit {
    fn drop(&mut self) {
        self.in_progress.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_acquire_only_one_permit_at_a_time() {
        let gate = AttemptGate::new();
        let permit = gate.try_acquire().expect("gate starts open");

        assert!(gate.try_acquire().is_none());
        assert_eq!(gate.state(), AttemptState::Authenticating);

        drop(permit);
        assert!(gate.is_idle());
        assert!(gate.try_acquire().is_some());
    }

    #[test]
    fn test_clones_share_state() {
        let gate = AttemptGate::new();
        let observer = gate.clone();

        let _permit = gate.try_acquire().unwrap();

        assert_eq!(observer.state(), AttemptState::Authenticating);
        assert!(observer.try_acquire().is_none());
    }

    #[test]
    fn test_permit_released_on_unwind() {
        let gate = AttemptGate::new();
        let result = std::panic::catch_unwind({
            let gate = gate.clone();
            move || {
                let _permit = gate.try_acquire().unwrap();
                panic!("attempt blew up");
            }
        });
        assert!(result.is_err());
        assert!(gate.is_idle());
    }
}

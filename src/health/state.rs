//! Backend health state machine.
//!
//! # States
//! - Healthy: backend receives traffic
//! - Unhealthy: backend excluded from load balancing
//!
//! # State Transitions
//! ```text
//! Healthy → Unhealthy: consecutive failures >= unhealthy_threshold
//! Unhealthy → Healthy: consecutive successes >= healthy_threshold
//! ```

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Health State enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    Healthy,
    Unhealthy,
}

impl From<bool> for HealthState {
    fn from(healthy: bool) -> Self {
        if healthy {
            HealthState::Healthy
        } else {
            HealthState::Unhealthy
        }
    }
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthState::Healthy => f.write_str("healthy"),
            HealthState::Unhealthy => f.write_str("unhealthy"),
        }
    }
}

/// Consecutive probe outcomes for one backend.
#[derive(Debug, Default)]
pub struct ProbeCounters {
    consecutive_failures: AtomicUsize,
    consecutive_successes: AtomicUsize,
}

impl ProbeCounters {
    /// Record a successful probe.
    ///
    /// Returns true once the success streak reaches `healthy_threshold`.
    pub fn record_success(&self, healthy_threshold: usize) -> bool {
        self.consecutive_failures.store(0, Ordering::Relaxed);
        let successes = self.consecutive_successes.fetch_add(1, Ordering::Relaxed) + 1;
        successes >= healthy_threshold
    }

    /// Record a failed probe.
    ///
    /// Returns true once the failure streak reaches `unhealthy_threshold`.
    pub fn record_failure(&self, unhealthy_threshold: usize) -> bool {
        self.consecutive_successes.store(0, Ordering::Relaxed);
        let failures = self.consecutive_failures.fetch_add(1, Ordering::Relaxed) + 1;
        failures >= unhealthy_threshold
    }

    pub fn reset(&self) {
        self.consecutive_failures.store(0, Ordering::Relaxed);
        self.consecutive_successes.store(0, Ordering::Relaxed);
    }

    pub fn failures(&self) -> usize {
        self.consecutive_failures.load(Ordering::Relaxed)
    }

    pub fn successes(&self) -> usize {
        self.consecutive_successes.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_streak_reaches_threshold() {
        let counters = ProbeCounters::default();
        assert!(!counters.record_failure(3));
        assert!(!counters.record_failure(3));
        assert!(counters.record_failure(3));
        assert_eq!(counters.failures(), 3);
    }

    #[test]
    fn test_success_resets_failures() {
        let counters = ProbeCounters::default();
        counters.record_failure(3);
        counters.record_failure(3);
        assert!(!counters.record_success(2));
        assert_eq!(counters.failures(), 0);
        assert!(!counters.record_failure(3));
    }

    #[test]
    fn test_state_display() {
        assert_eq!(HealthState::from(true).to_string(), "healthy");
        assert_eq!(HealthState::from(false).to_string(), "unhealthy");
    }
}

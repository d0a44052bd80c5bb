//! Health tracking.
//!
//! # Responsibilities
//! - Turn probe outcomes into health flag transitions
//! - Apply transitions to the registry via `set_health`
//!
//! # Design Decisions
//! - Hysteresis prevents flapping
//! - Counters reset on state transition
//! - The tracker is the only writer of health flags

use std::sync::Arc;

use crate::config::HealthCheckConfig;
use crate::health::state::{HealthState, ProbeCounters};
use crate::load_balancer::BackendRegistry;

/// Owns the per-backend probe counters and drives health transitions.
#[derive(Debug)]
pub struct HealthTracker {
    registry: Arc<BackendRegistry>,
    counters: Vec<ProbeCounters>,
    healthy_threshold: usize,
    unhealthy_threshold: usize,
}

impl HealthTracker {
    pub fn new(registry: Arc<BackendRegistry>, config: &HealthCheckConfig) -> Self {
        let counters = (0..registry.len()).map(|_| ProbeCounters::default()).collect();
        Self {
            registry,
            counters,
            healthy_threshold: config.healthy_threshold.max(1) as usize,
            unhealthy_threshold: config.unhealthy_threshold.max(1) as usize,
        }
    }

    pub fn registry(&self) -> &Arc<BackendRegistry> {
        &self.registry
    }

    /// Record one probe outcome for the backend at `index`.
    ///
    /// Returns the new state when this outcome caused a transition.
    pub fn report(&self, index: usize, success: bool) -> Option<HealthState> {
        let backend = self.registry.get(index)?;
        let counters = self.counters.get(index)?;
        let healthy = backend.is_healthy();

        let crossed = if success {
            counters.record_success(self.healthy_threshold)
        } else {
            counters.record_failure(self.unhealthy_threshold)
        };

        if crossed && healthy != success {
            counters.reset();
            self.registry.set_health(index, success);
            return Some(HealthState::from(success));
        }

        tracing::trace!(
            backend = %backend.name(),
            failures = counters.failures(),
            successes = counters.successes(),
            "Probe outcome recorded"
        );
        None
    }

    /// Force the health flag of the backend at `index`.
    ///
    /// Returns the previous state, or `None` if no backend has that index.
    pub fn mark(&self, index: usize, healthy: bool) -> Option<HealthState> {
        let previous = self.registry.set_health(index, healthy)?;
        if let Some(counters) = self.counters.get(index) {
            counters.reset();
        }
        Some(HealthState::from(previous))
    }

    /// Current state of the backend at `index`.
    pub fn state(&self, index: usize) -> Option<HealthState> {
        self.registry
            .get(index)
            .map(|backend| HealthState::from(backend.is_healthy()))
    }
}

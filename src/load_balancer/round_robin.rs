//! Round-robin load balancing strategy.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::load_balancer::{Backend, BackendRegistry, SelectionError, SelectionStrategy};

/// Round-robin selector.
///
/// Each call takes the next cursor position with a single `fetch_add`, so
/// concurrent callers never share a position. When the backend at that
/// position is unhealthy the scan walks forward at most one full cycle, then
/// advances the cursor past the slots it skipped so the next caller resumes
/// after the backend that was actually chosen.
#[derive(Debug, Default)]
pub struct RoundRobin {
    cursor: AtomicUsize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the rotation at `position` instead of zero.
    pub fn starting_at(position: usize) -> Self {
        Self {
            cursor: AtomicUsize::new(position),
        }
    }

    /// Current cursor value.
    pub fn cursor(&self) -> usize {
        self.cursor.load(Ordering::Relaxed)
    }
}

impl SelectionStrategy for RoundRobin {
    fn select(&self, registry: &BackendRegistry) -> Result<Arc<Backend>, SelectionError> {
        if registry.is_empty() {
            return Err(SelectionError::NoAvailableBackend { total: 0 });
        }
        let backends = registry.list();
        let len = backends.len();

        let start = self.cursor.fetch_add(1, Ordering::Relaxed);

        for offset in 0..len {
            let index = (start.wrapping_add(offset)) % len;
            let backend = &backends[index];
            if backend.is_healthy() {
                if offset > 0 {
                    self.cursor.fetch_add(offset, Ordering::Relaxed);
                }
                return Ok(backend.clone());
            }
            tracing::debug!(
                backend = %backend.name(),
                addr = %backend.addr(),
                "Backend is not healthy, trying next one"
            );
        }

        Err(SelectionError::NoAvailableBackend { total: len })
    }

    fn name(&self) -> &'static str {
        "round_robin"
    }
}

//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Request arrives at the dispatcher
//!     → SelectionStrategy::select(&registry)
//!         - round_robin.rs (rotate through backends, skip unhealthy)
//!     → registry.rs (ordered backends, per-backend health flag)
//!     → Return backend or SelectionError::NoAvailableBackend
//! ```
//!
//! # Design Decisions
//! - Strategies own their own state (the round-robin cursor)
//! - The registry is immutable apart from the health flags
//! - Unhealthy backends excluded from selection

pub mod backend;
pub mod registry;
pub mod round_robin;

use std::sync::Arc;

use crate::config::Algorithm;

pub use backend::Backend;
pub use registry::BackendRegistry;
pub use round_robin::RoundRobin;

/// Reasons a strategy could not produce a backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("no available backend ({total} configured, none healthy)")]
    NoAvailableBackend { total: usize },
}

/// A backend selection algorithm.
///
/// Implementations must be safe to call from any number of tasks at once.
pub trait SelectionStrategy: Send + Sync + std::fmt::Debug {
    /// Pick one healthy backend from the registry.
    fn select(&self, registry: &BackendRegistry) -> Result<Arc<Backend>, SelectionError>;

    /// Short identifier used in logs.
    fn name(&self) -> &'static str;
}

/// Build the strategy configured for the balancer.
pub fn build_strategy(algorithm: Algorithm) -> Box<dyn SelectionStrategy> {
    match algorithm {
        Algorithm::RoundRobin => Box::new(RoundRobin::new()),
    }
}

//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Active health checks (active.rs):
//!     Periodic timer
//!     → Probe each backend's health endpoint
//!     → tracker.rs
//!
//! Tracker (tracker.rs):
//!     Probe outcome
//!     → state.rs counters
//!     → registry.set_health() when a threshold is crossed
//! ```
//!
//! # Design Decisions
//! - Every backend starts healthy
//! - State transitions require consecutive successes/failures
//! - Health state is per-backend; the dispatcher never changes it

pub mod active;
pub mod state;
pub mod tracker;

pub use active::HealthMonitor;
pub use state::HealthState;
pub use tracker::HealthTracker;

//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single backend server (name, address, position)
//! - Hold the backend's health flag

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};

/// A single backend server.
///
/// Identity is fixed at construction. Only the health flag changes, and only
/// through [`BackendRegistry::set_health`](super::registry::BackendRegistry::set_health).
#[derive(Debug)]
pub struct Backend {
    /// Position in the registry.
    index: usize,
    /// Human readable name used in logs.
    name: String,
    /// The address of the backend.
    addr: SocketAddr,
    /// Eligibility for traffic. Starts healthy.
    healthy: AtomicBool,
}

impl Backend {
    pub(crate) fn new(index: usize, name: impl Into<String>, addr: SocketAddr) -> Self {
        Self {
            index,
            name: name.into(),
            addr,
            healthy: AtomicBool::new(true),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Return true if the backend may receive traffic.
    pub fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::Acquire)
    }

    /// Store a new health flag, returning the previous one.
    pub(crate) fn swap_health(&self, healthy: bool) -> bool {
        self.healthy.swap(healthy, Ordering::AcqRel)
    }
}

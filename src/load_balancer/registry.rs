//! Backend registry.
//!
//! # Responsibilities
//! - Own the ordered list of backends built from configuration
//! - Expose a read-only view for selection and health checking
//! - Apply health flag updates to a single backend
//!
//! The list is immutable after construction, so reads need no locking. Each
//! backend carries its own atomic flag; there is no registry-wide lock.

use std::sync::Arc;

use crate::config::{BackendConfig, ConfigError, ValidationError};
use crate::load_balancer::backend::Backend;

/// The ordered set of known backends.
#[derive(Debug)]
pub struct BackendRegistry {
    backends: Vec<Arc<Backend>>,
}

impl BackendRegistry {
    /// Build a registry from configuration, preserving the configured order.
    pub fn from_config(configs: &[BackendConfig]) -> Result<Self, ConfigError> {
        let mut errors = Vec::new();
        let mut backends = Vec::with_capacity(configs.len());

        for (index, config) in configs.iter().enumerate() {
            let name = config.display_name(index);
            match config.socket_addr() {
                Ok(addr) => backends.push(Arc::new(Backend::new(index, name, addr))),
                Err(_) => errors.push(ValidationError::InvalidServerAddress {
                    name,
                    address: config.address.clone(),
                }),
            }
        }

        if backends.is_empty() && errors.is_empty() {
            errors.push(ValidationError::NoServers);
        }
        if !errors.is_empty() {
            return Err(ConfigError::Validation(errors));
        }

        Ok(Self { backends })
    }

    /// Build a registry from already-resolved `(name, address)` pairs.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, std::net::SocketAddr)>,
        S: Into<String>,
    {
        let backends = entries
            .into_iter()
            .enumerate()
            .map(|(index, (name, addr))| Arc::new(Backend::new(index, name, addr)))
            .collect();
        Self { backends }
    }

    /// Ordered, read-only view of every backend.
    pub fn list(&self) -> &[Arc<Backend>] {
        &self.backends
    }

    pub fn get(&self, index: usize) -> Option<&Arc<Backend>> {
        self.backends.get(index)
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Number of backends currently eligible for traffic.
    pub fn healthy_count(&self) -> usize {
        self.backends.iter().filter(|b| b.is_healthy()).count()
    }

    /// Set the health flag of the backend at `index`.
    ///
    /// Returns the previous flag, or `None` if no backend has that index.
    pub fn set_health(&self, index: usize, healthy: bool) -> Option<bool> {
        let backend = self.backends.get(index)?;
        let previous = backend.swap_health(healthy);
        if previous != healthy {
            let available = self.healthy_count();
            if healthy {
                tracing::info!(backend = %backend.name(), addr = %backend.addr(), available, "Backend marked healthy");
            } else {
                tracing::warn!(backend = %backend.name(), addr = %backend.addr(), available, "Backend marked unhealthy");
            }
        }
        Some(previous)
    }
}

//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, names and value ranges
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BalancerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use axum::http::HeaderValue;

use crate::config::schema::BalancerConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("no servers configured")]
    NoServers,
    #[error("invalid listen address '{0}'")]
    InvalidListenAddress(String),
    #[error("balancer name '{0}' is not a valid header value")]
    InvalidBalancerName(String),
    #[error("server '{name}' has invalid address '{address}'")]
    InvalidServerAddress { name: String, address: String },
    #[error("duplicate server name '{0}'")]
    DuplicateServerName(String),
    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),
    #[error("health check path '{0}' must start with '/'")]
    InvalidHealthPath(String),
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &BalancerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.balancer.socket_addr().is_err() {
        errors.push(ValidationError::InvalidListenAddress(
            config.balancer.bind_address.clone(),
        ));
    }
    if HeaderValue::from_str(&config.balancer.name).is_err() {
        errors.push(ValidationError::InvalidBalancerName(config.balancer.name.clone()));
    }

    if config.servers.is_empty() {
        errors.push(ValidationError::NoServers);
    }

    let mut seen = HashSet::new();
    for (position, server) in config.servers.iter().enumerate() {
        let name = server.display_name(position);
        if server.socket_addr().is_err() {
            errors.push(ValidationError::InvalidServerAddress {
                name: name.clone(),
                address: server.address.clone(),
            });
        }
        if !seen.insert(name.clone()) {
            errors.push(ValidationError::DuplicateServerName(name));
        }
    }

    let health = &config.health_check;
    if health.enabled {
        if health.interval_secs == 0 {
            errors.push(ValidationError::ZeroValue("health_check.interval_secs"));
        }
        if health.timeout_secs == 0 {
            errors.push(ValidationError::ZeroValue("health_check.timeout_secs"));
        }
        if health.healthy_threshold == 0 {
            errors.push(ValidationError::ZeroValue("health_check.healthy_threshold"));
        }
        if health.unhealthy_threshold == 0 {
            errors.push(ValidationError::ZeroValue("health_check.unhealthy_threshold"));
        }
        if !health.path.starts_with('/') {
            errors.push(ValidationError::InvalidHealthPath(health.path.clone()));
        }
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroValue("timeouts.connect_secs"));
    }
    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::ZeroValue("timeouts.upstream_secs"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

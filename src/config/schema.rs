//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the balancer.
//! All types derive Serde traits for deserialization from TOML or JSON files.

use serde::{Deserialize, Serialize};
use std::net::{AddrParseError, SocketAddr};

/// Host used for backends configured with a bare port.
pub const DEFAULT_BACKEND_HOST: &str = "127.0.0.1";

/// Host used for a listener configured with a bare port.
pub const DEFAULT_LISTEN_HOST: &str = "0.0.0.0";

/// Root configuration for the balancer.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BalancerConfig {
    /// The balancer's own identity and listener.
    pub balancer: ListenerConfig,

    /// Ordered backend definitions. Order defines the rotation.
    pub servers: Vec<BackendConfig>,

    /// Health check settings.
    pub health_check: HealthCheckConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Name reported in the `X-Server-Name` response header.
    pub name: String,

    /// Bind address (e.g., "0.0.0.0:8080"). A bare port is accepted.
    #[serde(alias = "port")]
    pub bind_address: String,

    /// Backend selection algorithm.
    #[serde(alias = "type")]
    pub algorithm: Algorithm,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            name: "Load Balancer".to_string(),
            bind_address: "0.0.0.0:8080".to_string(),
            algorithm: Algorithm::default(),
        }
    }
}

impl ListenerConfig {
    /// Resolve the bind address, expanding a bare port onto all interfaces.
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        resolve_address(&self.bind_address, DEFAULT_LISTEN_HOST)
    }
}

/// Supported selection algorithms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    #[default]
    #[serde(alias = "round-robin", alias = "roundrobin")]
    RoundRobin,
}

/// Backend server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Backend identifier used in logs. Defaults to `Server <n>`.
    #[serde(default)]
    pub name: String,

    /// Backend address (e.g., "127.0.0.1:3000"). A bare port is accepted.
    #[serde(alias = "port")]
    pub address: String,
}

impl BackendConfig {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }

    /// Resolve the backend address, expanding a bare port onto loopback.
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        resolve_address(&self.address, DEFAULT_BACKEND_HOST)
    }

    /// Name to use for the backend at `position` in the server list.
    pub fn display_name(&self, position: usize) -> String {
        if self.name.trim().is_empty() {
            format!("Server {}", position + 1)
        } else {
            self.name.clone()
        }
    }
}

/// Parse `raw` as a socket address, accepting `"8081"` and `":8081"` forms.
pub fn resolve_address(raw: &str, default_host: &str) -> Result<SocketAddr, AddrParseError> {
    let raw = raw.trim();
    let port = raw.strip_prefix(':').unwrap_or(raw);
    if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) {
        return format!("{}:{}", default_host, port).parse();
    }
    raw.parse()
}

/// Health check configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Enable active health checks.
    pub enabled: bool,

    /// Health check interval in seconds.
    pub interval_secs: u64,

    /// Health check timeout in seconds.
    pub timeout_secs: u64,

    /// Path to probe for HTTP health checks.
    pub path: String,

    /// Number of consecutive failures before marking unhealthy.
    pub unhealthy_threshold: u32,

    /// Number of consecutive successes before marking healthy.
    pub healthy_threshold: u32,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 10,
            timeout_secs: 5,
            path: "/health".to_string(),
            unhealthy_threshold: 3,
            healthy_threshold: 2,
        }
    }
}

/// Timeout configuration for upstream calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Time allowed for the backend to return response headers, in seconds.
    pub upstream_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            upstream_secs: 30,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive.
    pub log_level: String,

    /// Output format for log lines.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

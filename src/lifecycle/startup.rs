//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the server from a validated configuration
//! - Bind the listener
//! - Serve until a shutdown signal arrives
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last (traffic only when ready)

use tokio::net::TcpListener;

use crate::config::{BalancerConfig, ConfigError};
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};

/// Errors that stop the balancer before or while serving.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Start the balancer described by `config` and serve until SIGINT/SIGTERM.
pub async fn run(config: BalancerConfig) -> Result<(), StartupError> {
    let address = config.balancer.bind_address.clone();
    let bind_addr = config.balancer.socket_addr().map_err(|e| StartupError::Bind {
        address: address.clone(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, e),
    })?;

    let server = HttpServer::new(config)?;
    for backend in server.registry().list() {
        tracing::info!(
            index = backend.index(),
            backend = %backend.name(),
            addr = %backend.addr(),
            "Registered backend"
        );
    }

    let listener = TcpListener::bind(bind_addr)
        .await
        .map_err(|source| StartupError::Bind { address, source })?;
    tracing::info!(
        address = %bind_addr,
        health_checks = server.config().health_check.enabled,
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        trigger.trigger();
    });

    server.run(listener, shutdown).await.map_err(StartupError::Serve)
}

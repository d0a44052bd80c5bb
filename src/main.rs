//! HTTP load balancer.
//!
//! # Architecture Overview
//!
//! ```text
//!                              ┌──────────────────────────────────────────────────┐
//!                              │                   BALANCER                        │
//!                              │                                                   │
//!     Client Request           │  ┌─────────┐    ┌────────────┐    ┌───────────┐  │
//!     ─────────────────────────┼─▶│  axum   │───▶│ dispatcher │───▶│ selection │  │
//!                              │  │ server  │    │            │    │ strategy  │  │
//!                              │  └─────────┘    └─────┬──────┘    └─────┬─────┘  │
//!                              │                       │                 │        │
//!                              │                       │                 ▼        │
//!                              │                       │          ┌───────────┐   │
//!                              │                       │          │ registry  │◀──┼── health
//!                              │                       │          │ + health  │   │   monitor
//!                              │                       ▼          └───────────┘   │
//!     Client Response          │  ┌─────────┐    ┌────────────┐                   │
//!     ◀────────────────────────┼──│ X-Server│◀───│   hyper    │◀──────────────────┼──── Backend
//!                              │  │  -Name  │    │   client   │                   │     Server
//!                              │  └─────────┘    └────────────┘                   │
//!                              └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use http_balancer::config::load_config;
use http_balancer::lifecycle::startup;
use http_balancer::observability::logging;

#[derive(Parser, Debug)]
#[command(name = "http-balancer", version, about = "Round-robin HTTP load balancer")]
struct Args {
    /// Configuration file (TOML, or JSON when the extension is .json).
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Override the listen address from the configuration.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let mut config = match load_config(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading config {}: {}", args.config.display(), e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(bind) = args.bind {
        config.balancer.bind_address = bind;
    }

    logging::init(&config.observability);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %args.config.display(),
        balancer = %config.balancer.name,
        algorithm = ?config.balancer.algorithm,
        "http-balancer starting"
    );

    match startup::run(config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Balancer terminated");
            ExitCode::FAILURE
        }
    }
}

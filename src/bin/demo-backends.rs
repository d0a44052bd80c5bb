//! Demo backend servers for local testing of the balancer.
//!
//! Starts one HTTP server per entry in the balancer's `servers` list.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use clap::Parser;
use tokio::net::TcpListener;
use tokio::task::JoinSet;

use http_balancer::config::load_config;
use http_balancer::observability::logging;

#[derive(Parser)]
#[command(name = "demo-backends")]
#[command(about = "Serve every backend listed in the balancer config", long_about = None)]
struct Cli {
    /// Balancer configuration file.
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Start the named backend in the unhealthy state (repeatable).
    #[arg(long)]
    unhealthy: Vec<String>,
}

#[derive(Clone)]
struct DemoBackend {
    name: Arc<str>,
    healthy: Arc<AtomicBool>,
}

async fn index(State(backend): State<DemoBackend>) -> String {
    format!("Serving from the server: {}", backend.name)
}

async fn health(State(backend): State<DemoBackend>) -> (StatusCode, &'static str) {
    if backend.healthy.load(Ordering::Relaxed) {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    }
}

async fn toggle(State(backend): State<DemoBackend>) -> &'static str {
    let was_healthy = backend.healthy.fetch_xor(true, Ordering::Relaxed);
    tracing::info!(backend = %backend.name, healthy = !was_healthy, "Health toggled");
    if was_healthy {
        "unhealthy"
    } else {
        "healthy"
    }
}

fn router(backend: DemoBackend) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/health/toggle", post(toggle))
        .with_state(backend)
}

async fn serve(addr: SocketAddr, backend: DemoBackend) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(backend = %backend.name, address = %addr, "Demo backend listening");
    axum::serve(listener, router(backend)).await
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    logging::init(&config.observability);

    let mut servers = JoinSet::new();
    for (position, server) in config.servers.iter().enumerate() {
        let name = server.display_name(position);
        let addr = server.socket_addr()?;
        let backend = DemoBackend {
            healthy: Arc::new(AtomicBool::new(!cli.unhealthy.contains(&name))),
            name: name.into(),
        };
        servers.spawn(serve(addr, backend));
    }

    while let Some(result) = servers.join_next().await {
        result??;
    }
    Ok(())
}

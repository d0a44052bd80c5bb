//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the registry, strategy and dispatcher from configuration
//! - Create Axum Router sending every path to the dispatcher
//! - Wire up middleware (tracing, request ID)
//! - Spawn the health monitor and serve until shutdown

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, Request},
    response::Response,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{BalancerConfig, ConfigError, ValidationError};
use crate::health::{HealthMonitor, HealthTracker};
use crate::http::dispatcher::Dispatcher;
use crate::http::request::UuidRequestId;
use crate::lifecycle::Shutdown;
use crate::load_balancer::{build_strategy, BackendRegistry};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

/// HTTP server for the balancer.
pub struct HttpServer {
    router: Router,
    config: BalancerConfig,
    tracker: Arc<HealthTracker>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: BalancerConfig) -> Result<Self, ConfigError> {
        let name = HeaderValue::from_str(&config.balancer.name).map_err(|_| {
            ConfigError::Validation(vec![ValidationError::InvalidBalancerName(
                config.balancer.name.clone(),
            )])
        })?;

        let registry = Arc::new(BackendRegistry::from_config(&config.servers)?);
        let tracker = Arc::new(HealthTracker::new(registry.clone(), &config.health_check));
        let strategy = build_strategy(config.balancer.algorithm);

        let dispatcher = Arc::new(Dispatcher::new(
            name,
            registry,
            strategy,
            &config.timeouts,
        ));

        let router = Self::build_router(AppState { dispatcher });
        Ok(Self {
            router,
            config,
            tracker,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// A clone of the fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Health tracker shared with the monitor; also the handle for manual overrides.
    pub fn tracker(&self) -> Arc<HealthTracker> {
        self.tracker.clone()
    }

    pub fn registry(&self) -> &Arc<BackendRegistry> {
        self.tracker.registry()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &BalancerConfig {
        &self.config
    }

    /// Run the server, accepting connections on the given listener until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let mut server_shutdown = shutdown.subscribe();
        let monitor_shutdown = shutdown.subscribe();

        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            balancer = %self.config.balancer.name,
            backends = self.registry().len(),
            "HTTP server starting"
        );

        if self.config.health_check.enabled {
            let monitor = HealthMonitor::new(self.tracker.clone(), self.config.health_check.clone());
            tokio::spawn(monitor.run(monitor_shutdown));
        } else {
            tracing::info!("Active health checks disabled");
        }

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                server_shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!(graceful = shutdown.is_triggered(), "HTTP server stopped");
        Ok(())
    }
}

/// Every path lands here.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    state.dispatcher.handle(request).await
}

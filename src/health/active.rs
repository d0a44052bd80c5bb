//! Active health checking.
//!
//! # Responsibilities
//! - Periodically probe backends
//! - Report results to the health tracker

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request};
use futures_util::future::join_all;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::time;

use crate::config::HealthCheckConfig;
use crate::health::tracker::HealthTracker;
use crate::lifecycle::shutdown::ShutdownSignal;
use crate::load_balancer::Backend;

const USER_AGENT: &str = "http-balancer-health-check";

pub struct HealthMonitor {
    tracker: Arc<HealthTracker>,
    config: HealthCheckConfig,
    client: Client<HttpConnector, Body>,
}

impl HealthMonitor {
    pub fn new(tracker: Arc<HealthTracker>, config: HealthCheckConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.timeout_secs)));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Self {
            tracker,
            config,
            client,
        }
    }

    pub async fn run(self, mut shutdown: ShutdownSignal) {
        tracing::info!(
            interval = self.config.interval_secs,
            path = %self.config.path,
            backends = self.tracker.registry().len(),
            "Health monitor starting"
        );

        let interval = Duration::from_secs(self.config.interval_secs.max(1));
        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.check_all().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Health monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Probe every backend once, concurrently, and report the outcomes.
    pub async fn check_all(&self) {
        let probes = self
            .tracker
            .registry()
            .list()
            .iter()
            .map(|backend| self.probe(backend));
        let outcomes = join_all(probes).await;

        for (index, healthy) in outcomes.into_iter().enumerate() {
            if let Some(state) = self.tracker.report(index, healthy) {
                tracing::debug!(index, %state, "Health state changed");
            }
        }
    }

    async fn probe(&self, backend: &Backend) -> bool {
        let addr = backend.addr();
        let uri = format!("http://{}{}", addr, self.config.path);

        let request = match Request::builder()
            .method("GET")
            .uri(uri)
            .header(header::USER_AGENT, USER_AGENT)
            .body(Body::empty())
        {
            Ok(req) => req,
            Err(e) => {
                tracing::error!(backend = %backend.name(), error = %e, "Failed to build health check request");
                return false;
            }
        };

        let timeout = Duration::from_secs(self.config.timeout_secs);
        match time::timeout(timeout, self.client.request(request)).await {
            Ok(Ok(response)) => {
                let success = response.status().is_success();
                if !success {
                    tracing::warn!(backend = %backend.name(), addr = %addr, status = %response.status(), "Health check failed: non-success status");
                }
                success
            }
            Ok(Err(e)) => {
                tracing::warn!(backend = %backend.name(), addr = %addr, error = %e, "Health check failed: connection error");
                false
            }
            Err(_) => {
                tracing::warn!(backend = %backend.name(), addr = %addr, "Health check failed: timeout");
                false
            }
        }
    }
}

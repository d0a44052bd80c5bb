//! Request dispatch.
//!
//! # Responsibilities
//! - Ask the selection strategy for a backend
//! - Forward the request (method, headers, streamed body) to that backend
//! - Relay the backend's response, tagged with the balancer name
//! - Translate selection and forwarding failures into 503 / 502
//!
//! # Design Decisions
//! - No retries and no failover: one backend per request
//! - The dispatcher never changes backend health
//! - Dropping the handler future (client went away) drops the upstream call
//! - `upstream_secs` bounds the wait for response headers only; the relayed
//!   body streams without a deadline and ends when either side closes

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{HeaderValue, Request, Response, StatusCode, Version};
use axum::response::IntoResponse;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::time;

use crate::config::TimeoutConfig;
use crate::http::request::{append_forwarded_for, request_id, upstream_uri};
use crate::http::response::{error_response, strip_hop_by_hop, tag_server_name};
use crate::load_balancer::{Backend, BackendRegistry, SelectionError, SelectionStrategy};

/// Failure talking to the chosen backend.
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    #[error("invalid upstream uri: {0}")]
    InvalidUri(#[from] axum::http::Error),
    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),
    #[error("upstream did not respond within {0:?}")]
    Timeout(Duration),
}

/// Everything that can stop a request from being served by a backend.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error("forwarding to {backend} failed: {source}")]
    Forwarding {
        backend: String,
        #[source]
        source: ForwardError,
    },
}

impl DispatchError {
    pub fn status(&self) -> StatusCode {
        match self {
            DispatchError::Selection(SelectionError::NoAvailableBackend { .. }) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            DispatchError::Forwarding { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            DispatchError::Selection(_) => "No server available",
            DispatchError::Forwarding { .. } => "Bad gateway",
        }
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response<Body> {
        error_response(self.status(), self.message())
    }
}

/// Forwards each inbound request to one backend picked by the strategy.
///
/// Holds no per-request state; one instance serves every connection.
pub struct Dispatcher {
    name: HeaderValue,
    registry: Arc<BackendRegistry>,
    strategy: Box<dyn SelectionStrategy>,
    client: Client<HttpConnector, Body>,
    upstream_timeout: Duration,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("name", &self.name)
            .field("strategy", &self.strategy)
            .field("backends", &self.registry.len())
            .field("upstream_timeout", &self.upstream_timeout)
            .finish()
    }
}

impl Dispatcher {
    pub fn new(
        name: HeaderValue,
        registry: Arc<BackendRegistry>,
        strategy: Box<dyn SelectionStrategy>,
        timeouts: &TimeoutConfig,
    ) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(timeouts.connect_secs)));
        connector.set_nodelay(true);
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Self {
            name,
            registry,
            strategy,
            client,
            upstream_timeout: Duration::from_secs(timeouts.upstream_secs),
        }
    }

    pub fn name(&self) -> &HeaderValue {
        &self.name
    }

    pub fn registry(&self) -> &Arc<BackendRegistry> {
        &self.registry
    }

    /// Serve one request: select, forward, relay.
    pub async fn handle(&self, request: Request<Body>) -> Response<Body> {
        let start = Instant::now();
        let request_id = request_id(request.headers()).to_string();
        let method = request.method().clone();
        let path = request.uri().path().to_string();

        let mut response = match self.dispatch(request).await {
            Ok(response) => response,
            Err(e) => {
                match &e {
                    DispatchError::Selection(_) => {
                        tracing::warn!(request_id = %request_id, error = %e, "No backend available");
                    }
                    DispatchError::Forwarding { .. } => {
                        tracing::error!(request_id = %request_id, error = %e, "Upstream error");
                    }
                }
                e.into_response()
            }
        };
        tag_server_name(&mut response, &self.name);

        tracing::debug!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = %response.status(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Request dispatched"
        );
        response
    }

    /// Select a backend and forward the request to it.
    pub async fn dispatch(&self, request: Request<Body>) -> Result<Response<Body>, DispatchError> {
        let backend = self.strategy.select(&self.registry)?;

        tracing::debug!(
            request_id = %request_id(request.headers()),
            backend = %backend.name(),
            addr = %backend.addr(),
            strategy = self.strategy.name(),
            "Forwarding request"
        );

        self.forward(&backend, request)
            .await
            .map_err(|source| DispatchError::Forwarding {
                backend: backend.name().to_string(),
                source,
            })
    }

    async fn forward(
        &self,
        backend: &Backend,
        request: Request<Body>,
    ) -> Result<Response<Body>, ForwardError> {
        let client_ip = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());

        let (mut parts, body) = request.into_parts();
        parts.uri = upstream_uri(&parts.uri, backend.addr())?;
        // The upstream connector speaks HTTP/1.1 regardless of the inbound version.
        parts.version = Version::HTTP_11;
        strip_hop_by_hop(&mut parts.headers);
        if let Some(ip) = client_ip {
            append_forwarded_for(&mut parts.headers, ip);
        }

        let upstream = Request::from_parts(parts, body);
        // Headers only; the body is relayed as it arrives.
        let response = time::timeout(self.upstream_timeout, self.client.request(upstream))
            .await
            .map_err(|_| ForwardError::Timeout(self.upstream_timeout))??;

        let (mut parts, body) = response.into_parts();
        strip_hop_by_hop(&mut parts.headers);
        Ok(Response::from_parts(parts, Body::new(body)))
    }
}

//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use http_balancer::config::{BackendConfig, BalancerConfig};
use http_balancer::health::HealthTracker;
use http_balancer::{HttpServer, Shutdown};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// A request as seen by a mock backend.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// A backend that records every request and answers with a fixed reply.
#[derive(Clone)]
pub struct RecordingBackend {
    pub name: &'static str,
    pub addr: SocketAddr,
    received: Arc<Mutex<Vec<Recorded>>>,
}

impl RecordingBackend {
    pub fn received(&self) -> Vec<Recorded> {
        self.received.lock().unwrap().clone()
    }

    pub fn hits(&self) -> usize {
        self.received.lock().unwrap().len()
    }
}

#[derive(Clone)]
struct RecordingState {
    name: &'static str,
    reply: Bytes,
    received: Arc<Mutex<Vec<Recorded>>>,
}

async fn record(State(state): State<RecordingState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, 1024 * 1024).await.unwrap();
    state.received.lock().unwrap().push(Recorded {
        method: parts.method,
        uri: parts.uri,
        headers: parts.headers,
        body,
    });

    let mut response = Response::new(Body::from(state.reply.clone()));
    *response.status_mut() = StatusCode::CREATED;
    let headers = response.headers_mut();
    headers.insert("content-type", HeaderValue::from_static("application/json"));
    headers.insert("x-backend", HeaderValue::from_static(state.name));
    headers.insert("x-reply-token", HeaderValue::from_static("tok-123"));
    response
}

/// Start a recording backend on an ephemeral port.
pub async fn start_recording_backend(name: &'static str, reply: impl Into<Bytes>) -> RecordingBackend {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let received = Arc::new(Mutex::new(Vec::new()));
    let state = RecordingState {
        name,
        reply: reply.into(),
        received: received.clone(),
    };

    let app = Router::new().fallback(record).with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    RecordingBackend { name, addr, received }
}

/// Start a backend that names itself on `/` and reports `healthy` on `/health`.
pub async fn start_health_backend(name: &'static str, healthy: Arc<AtomicBool>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let app = Router::new()
        .route("/", get(move || async move { name }))
        .route(
            "/health",
            get(move || {
                let healthy = healthy.clone();
                async move {
                    if healthy.load(Ordering::SeqCst) {
                        (StatusCode::OK, "healthy").into_response()
                    } else {
                        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy").into_response()
                    }
                }
            }),
        );
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Start a raw TCP backend that writes `raw` to every connection.
pub async fn start_raw_backend(raw: &'static [u8]) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(raw).await;
                let _ = socket.shutdown().await;
            });
        }
    });
    addr
}

/// Start a backend that waits `delay` before answering.
pub async fn start_slow_backend(delay: Duration) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let app = Router::new().fallback(move || async move {
        tokio::time::sleep(delay).await;
        "late"
    });
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Start a backend that answers with its own `x-server-name` header.
pub async fn start_self_naming_backend(server_name: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let app = Router::new().fallback(move || async move { ([("x-server-name", server_name)], "named") });
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Flags set by a slow backend's handler.
#[derive(Clone, Default)]
pub struct HandlerFlags {
    /// Set when the handler future is dropped, finished or not.
    pub dropped: Arc<AtomicBool>,
    /// Set only when the handler ran to completion.
    pub finished: Arc<AtomicBool>,
}

struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Start a backend that waits `delay` before answering and reports through
/// `HandlerFlags` whether its handler was abandoned.
pub async fn start_watched_backend(delay: Duration) -> (SocketAddr, HandlerFlags) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let flags = HandlerFlags::default();

    let handler_flags = flags.clone();
    let app = Router::new().fallback(move || {
        let flags = handler_flags.clone();
        async move {
            let _guard = DropFlag(flags.dropped.clone());
            tokio::time::sleep(delay).await;
            flags.finished.store(true, Ordering::SeqCst);
            "late"
        }
    });
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (addr, flags)
}

/// An address with nothing listening on it.
pub fn closed_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

/// Balancer config over `backends` with health checks disabled.
pub fn balancer_config(name: &str, backends: &[(&str, SocketAddr)]) -> BalancerConfig {
    let mut config = BalancerConfig::default();
    config.balancer.name = name.to_string();
    config.balancer.bind_address = "127.0.0.1:0".to_string();
    for (backend, addr) in backends {
        config.servers.push(BackendConfig::new(*backend, addr.to_string()));
    }
    config.health_check.enabled = false;
    config
}

/// A running balancer.
pub struct Balancer {
    pub addr: SocketAddr,
    pub tracker: Arc<HealthTracker>,
    pub shutdown: Shutdown,
}

impl Balancer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for Balancer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a balancer on an ephemeral port.
pub async fn start_balancer(config: BalancerConfig) -> Balancer {
    let server = HttpServer::new(config).unwrap();
    let tracker = server.tracker();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.clone();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    Balancer {
        addr,
        tracker,
        shutdown,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

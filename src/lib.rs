//! HTTP load balancer library.
//!
//! Requests arrive at the [`http::Dispatcher`], which asks a
//! [`load_balancer::SelectionStrategy`] for a healthy backend from the
//! [`load_balancer::BackendRegistry`] and relays the exchange. The
//! [`health`] subsystem probes backends and flips their health flags.

pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod load_balancer;
pub mod observability;

pub use config::BalancerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;

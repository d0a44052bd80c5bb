//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, every path to one handler)
//!     → request.rs (request ID, upstream URI, x-forwarded-for)
//!     → dispatcher.rs (select backend, forward, relay)
//!     → response.rs (strip hop-by-hop, add X-Server-Name, error bodies)
//!     → Send to client
//! ```

pub mod dispatcher;
pub mod request;
pub mod response;
pub mod server;

pub use dispatcher::{DispatchError, Dispatcher, ForwardError};
pub use request::{UuidRequestId, X_REQUEST_ID};
pub use response::X_SERVER_NAME;
pub use server::HttpServer;

//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields
//!     → TraceLayer spans per request, tagged with x-request-id
//!
//! Consumers:
//!     → logging.rs subscriber (pretty or JSON to stdout)
//! ```

pub mod logging;

//! Structured logging and Prometheus metrics for the RFQ gateway.

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging;

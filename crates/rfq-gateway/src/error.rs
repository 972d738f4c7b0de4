//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Gas error: {0}")]
    Gas(#[from] rfq_gas::GasError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] rfq_telemetry::TelemetryError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;

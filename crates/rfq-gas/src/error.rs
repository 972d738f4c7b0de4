//! Gas subsystem error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GasError {
    /// Fee oracle failure or timeout. Retryable; distinct from the
    /// terminal "no further bid" decision, which is a value.
    #[error("Gas oracle error: {0}")]
    Oracle(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed oracle response: {0}")]
    MalformedResponse(String),
}

pub type GasResult<T> = Result<T, GasError>;

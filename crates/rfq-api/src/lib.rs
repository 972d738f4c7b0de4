//! Request admission and routing layer.
//!
//! Converts untrusted, chain-addressed input into typed parameters or
//! fails before any side effect, then dispatches to the per-chain swap
//! service and translates results back into API responses.
//!
//! Validation ordering is load-bearing: chain resolution precedes body
//! parsing (token resolution is chain-dependent), schema validation
//! precedes domain validation, and no collaborator is invoked until the
//! request has fully passed admission.

pub mod error;
pub mod handlers;
pub mod health;
pub mod integrators;
pub mod params;
pub mod server;
pub mod service;
pub mod tokens;
pub mod types;

pub use error::{ApiError, ServiceError, ValidationErrorCode, ValidationErrorItem};
pub use handlers::AppState;
pub use health::{HealthCheckCache, HEALTH_CHECK_RESULT_CACHE_DURATION};
pub use integrators::IntegratorDirectory;
pub use server::{create_router, run_server};
pub use service::{ServiceDirectory, SwapService};
pub use tokens::{TokenMetadata, TokenRegistry, NATIVE_TOKEN_ADDRESS};

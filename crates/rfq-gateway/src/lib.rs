//! RFQ gateway application: configuration, upstream wiring and startup.

pub mod config;
pub mod error;
pub mod upstream;

pub use config::{ChainConfig, GatewayConfig, IntegratorConfig, ServerConfig, TokenConfig};
pub use error::{AppError, AppResult};
pub use upstream::UpstreamSwapService;

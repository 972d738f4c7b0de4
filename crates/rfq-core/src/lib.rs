//! Core domain types for the RFQ gateway.
//!
//! This crate provides fundamental types used throughout the quote-serving
//! stack:
//! - `Wei`: precision-safe fee-market amounts
//! - `ChainId`, `TokenAddress`: validated chain-addressed identifiers
//! - `MarketOperation`: trading side enum
//! - `Integrator`: immutable API consumer snapshot

pub mod decimal;
pub mod error;
pub mod types;

pub use decimal::{to_unit_amount, Wei, MAX_TOKEN_DECIMALS};
pub use error::{CoreError, Result};
pub use types::{is_address, ChainId, Integrator, MarketOperation, TokenAddress};

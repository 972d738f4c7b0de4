//! Adaptive gas-fee bidding for the transaction submission pipeline.
//!
//! The bidding state machine is a pure function of the current base fee
//! and the prior submission context; the caller owns the context
//! lifecycle. Oracle access and capacity estimators live alongside it.

pub mod attendant;
pub mod bid;
pub mod error;
pub mod oracle;

pub use attendant::GasStationAttendant;
pub use bid::{next_bid, GasFees, SubmissionContext};
pub use error::{GasError, GasResult};
pub use oracle::{GasOracle, HttpGasOracle, Urgency};

//! Comparison price calculation for RFQ market makers.
//!
//! Derives the fee-adjusted benchmark price a market maker must beat
//! for its offer to be competitive with pooled liquidity.

pub mod comparison;

pub use comparison::{
    comparison_price, FeeEstimateError, LiquiditySource, MarketSideLiquidity, NativeOrderType,
    COMPARISON_PRICE_DECIMALS,
};

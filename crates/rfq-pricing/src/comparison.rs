//! Fee-adjusted comparison price.
//!
//! Takes the optimizer's adjusted rate and produces the maker-per-taker
//! price an RFQ market maker should aim to beat. The published price is
//! always biased to be harder for a maker to beat: maker amounts round
//! up, taker amounts round down.

use rfq_core::decimal::{round_dp_half_up, to_unit_amount};
use rfq_core::MarketOperation;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::warn;

/// Decimal places of a published comparison price.
pub const COMPARISON_PRICE_DECIMALS: u32 = 10;

/// Order type handed to the native-order fee estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeOrderType {
    Rfq,
    Limit,
}

/// Liquidity source flag handed to the exchange-overhead estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiquiditySource {
    RfqOrder,
    LimitOrder,
}

/// Why a fee estimate could not be produced.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FeeEstimateError {
    /// The fee schedule for this order type needs fill data, which is
    /// not available when pricing a single native order in isolation.
    #[error("fee schedule requires fill data")]
    FillDataRequired,
}

/// Per-side liquidity metadata needed to convert an ETH-denominated fee
/// into output-unit terms.
#[derive(Debug, Clone)]
pub struct MarketSideLiquidity {
    pub side: MarketOperation,
    /// Input token base units per one ETH. Input is the taker token for
    /// sells and the maker token for buys.
    pub input_amount_per_eth: Decimal,
    /// Output token base units per one ETH.
    pub output_amount_per_eth: Decimal,
    pub maker_token_decimals: u8,
    pub taker_token_decimals: u8,
}

/// Compute the comparison price for RFQ market makers to beat.
///
/// `adjusted_rate` is the fee-adjusted maker/taker rate from the
/// optimizer; `amount` is the client's fill amount in input units.
/// The estimators price a single native order fill and the exchange
/// overhead of routing through it.
///
/// Returns `None` when the price is not computable: either estimator
/// needs fill data, or a raw order amount comes out non-positive. That
/// is a documented degraded mode, not an error; callers branch on it.
pub fn comparison_price(
    adjusted_rate: Decimal,
    amount: Decimal,
    liquidity: &MarketSideLiquidity,
    native_order_fee: &dyn Fn(NativeOrderType) -> Result<Decimal, FeeEstimateError>,
    exchange_overhead: &dyn Fn(LiquiditySource) -> Result<Decimal, FeeEstimateError>,
) -> Option<Decimal> {
    // Price the penalty of a single native order. No fill data exists at
    // this point; if the fee schedule insists on it, the price is simply
    // not computable.
    let fee_in_eth = match (
        native_order_fee(NativeOrderType::Rfq),
        exchange_overhead(LiquiditySource::RfqOrder),
    ) {
        (Ok(fill_fee), Ok(overhead)) => fill_fee + overhead,
        _ => {
            warn!("native order fee schedule requires fill data");
            return None;
        }
    };

    // Fee penalty in output units: maker units for sells, taker units
    // for buys. When no output-per-ETH rate is known, derive it through
    // the input rate and the adjusted rate (inverted for buys).
    let fee_penalty = if !liquidity.output_amount_per_eth.is_zero() {
        liquidity.output_amount_per_eth * fee_in_eth
    } else {
        let rate = match liquidity.side {
            MarketOperation::Sell => adjusted_rate,
            MarketOperation::Buy => Decimal::ONE / adjusted_rate,
        };
        liquidity.input_amount_per_eth * fee_in_eth * rate
    };

    // The adjusted rate is maker/taker. Input is the taker token for
    // sells and the maker token for buys.
    let (order_maker_amount, order_taker_amount) = match liquidity.side {
        MarketOperation::Sell => (adjusted_rate * amount + fee_penalty, amount),
        MarketOperation::Buy => (amount, amount / adjusted_rate - fee_penalty),
    };

    if !(order_maker_amount > Decimal::ZERO && order_taker_amount > Decimal::ZERO) {
        return None;
    }

    // Round maker up and taker down: both shifts make the published
    // price harder for a maker to beat.
    let maker_unit = to_unit_amount(order_maker_amount.ceil(), liquidity.maker_token_decimals);
    let taker_unit = to_unit_amount(order_taker_amount.floor(), liquidity.taker_token_decimals);
    if taker_unit.is_zero() {
        return None;
    }

    Some(round_dp_half_up(
        maker_unit / taker_unit,
        COMPARISON_PRICE_DECIMALS,
    ))
}

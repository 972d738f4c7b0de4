//! Gas fee bidding state machine.
//!
//! Pure transition function: given the current base fee and the most
//! recent bid (if any), produce the next `{maxFeePerGas,
//! maxPriorityFeePerGas}` pair, or decide that bidding must stop.

use rfq_core::Wei;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// First bid's tip, in gwei.
const INITIAL_MAX_PRIORITY_FEE_PER_GAS_GWEI: u64 = 2;

/// The maximum tip we're willing to pay: 128 gwei.
const MAX_PRIORITY_FEE_PER_GAS_CAP: Decimal = dec!(128_000_000_000);

/// Tip multiplier per resubmission cycle.
const MAX_PRIORITY_FEE_PER_GAS_MULTIPLIER: Decimal = dec!(1.5);

/// RPC nodes need at least a 10% bump in both values to accept a
/// replacement transaction.
const REPLACEMENT_BUMP: Decimal = dec!(1.1);

/// An EIP-1559 fee bid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasFees {
    #[serde(rename = "maxFeePerGas")]
    pub max_fee_per_gas: Wei,
    #[serde(rename = "maxPriorityFeePerGas")]
    pub max_priority_fee_per_gas: Wei,
}

/// The most recent bid for a pending transaction.
///
/// Owned by the execution pipeline: created on the first bid, replaced
/// wholesale on each resubmission, discarded on confirmation or when the
/// ceiling is reached. The state machine only reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionContext {
    pub max_gas_fees: GasFees,
}

impl SubmissionContext {
    #[inline]
    pub fn new(max_gas_fees: GasFees) -> Self {
        Self { max_gas_fees }
    }
}

/// Compute the next fee bid, or `None` once the tip ceiling is reached.
///
/// First bid: 2 gwei tip, max fee of 2x the base fee plus the tip. The
/// doubled base fee over-provisions against base-fee drift between
/// bid computation and inclusion.
///
/// Resubmission: the tip grows 1.5x per cycle. Once it would reach
/// 128 gwei the machine stops bidding; the caller abandons the
/// transaction or escalates manually. Otherwise the new max fee is the
/// larger of a 10% bump over the previous bid (replacement minimum) and
/// 2x the current base fee plus the new tip (congestion sufficiency).
/// Both values are rounded up to integer wei.
pub fn next_bid(base_fee: Wei, prior: Option<&SubmissionContext>) -> Option<GasFees> {
    let Some(context) = prior else {
        let initial_tip = Wei::from_gwei(Decimal::from(INITIAL_MAX_PRIORITY_FEE_PER_GAS_GWEI));
        return Some(GasFees {
            max_fee_per_gas: base_fee * Decimal::TWO + initial_tip,
            max_priority_fee_per_gas: initial_tip,
        });
    };

    let GasFees {
        max_fee_per_gas: old_max_fee,
        max_priority_fee_per_gas: old_tip,
    } = context.max_gas_fees;

    let new_tip = old_tip * MAX_PRIORITY_FEE_PER_GAS_MULTIPLIER;
    if new_tip.inner() >= MAX_PRIORITY_FEE_PER_GAS_CAP {
        // Ceiling reached; don't put in any new transactions.
        return None;
    }

    let new_max_fee = (old_max_fee * REPLACEMENT_BUMP).max(base_fee * Decimal::TWO + new_tip);

    Some(GasFees {
        max_fee_per_gas: new_max_fee.ceil(),
        max_priority_fee_per_gas: new_tip.ceil(),
    })
}

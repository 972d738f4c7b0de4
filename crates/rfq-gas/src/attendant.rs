//! Gas station attendant: oracle-backed bidding and capacity estimates.

use crate::bid::{next_bid, GasFees, SubmissionContext};
use crate::error::GasResult;
use crate::oracle::{GasOracle, Urgency};
use rfq_core::Wei;
use rfq_telemetry::metrics::GAS_BIDS_TOTAL;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Base fee padding for six consecutive 10% increases (1.1^6).
const WORKER_BASE_FEE_PAD: Decimal = dec!(1.771561);

/// Gas estimate for a high-cost RFQ pair fill. The full system derives
/// this from a per-token metadata table; a fixed upper-bound estimate
/// keeps the capacity check conservative.
const WORKER_TRADE_GAS_ESTIMATE: Decimal = dec!(225_000);

/// Historical average tip paid per job: a 2 gwei opening tip multiplied
/// 1.5x per submission over ~1.5 submissions averages 2.75 gwei.
const AVG_MAX_PRIORITY_FEE_PER_GAS: Decimal = dec!(2_750_000_000);

/// Safe trade balance from historical submission data: 0.0825 ETH.
const SAFE_BALANCE_FOR_TRADE_WEI: Decimal = dec!(82_500_000_000_000_000);

/// Drives the bidding state machine against a fee oracle and answers
/// capacity questions for the execution pipeline. Holds no state.
pub struct GasStationAttendant<O: GasOracle> {
    oracle: O,
}

impl<O: GasOracle> GasStationAttendant<O> {
    pub fn new(oracle: O) -> Self {
        Self { oracle }
    }

    /// Fetch the current base fee and compute the next bid.
    ///
    /// `Ok(None)` means the tip ceiling was reached and bidding must
    /// stop; an `Err` is a retryable oracle failure.
    pub async fn next_bid_with_oracle(
        &self,
        prior: Option<&SubmissionContext>,
    ) -> GasResult<Option<GasFees>> {
        let base_fee = match self.oracle.base_fee_per_gas().await {
            Ok(base_fee) => base_fee,
            Err(error) => {
                GAS_BIDS_TOTAL.with_label_values(&["oracle_error"]).inc();
                return Err(error);
            }
        };
        let bid = next_bid(base_fee, prior);
        let outcome = if bid.is_some() { "bid" } else { "ceiling" };
        GAS_BIDS_TOTAL.with_label_values(&[outcome]).inc();
        Ok(bid)
    }

    /// Balance at which a worker can safely take on a trade.
    pub fn safe_balance_for_trade(&self) -> Wei {
        Wei::new(SAFE_BALANCE_FOR_TRADE_WEI)
    }

    /// Wei a worker needs to cover one high-cost trade: the base fee
    /// padded for six 10% increases plus the instant tip, times the
    /// trade gas estimate.
    pub async fn worker_balance_for_trade(&self) -> GasResult<Wei> {
        let base_fee = self.oracle.base_fee_per_gas().await?;
        let instant_tip = self.oracle.max_priority_fee_per_gas(Urgency::Instant).await?;

        let gas_rate = base_fee * WORKER_BASE_FEE_PAD + instant_tip;
        Ok(gas_rate * WORKER_TRADE_GAS_ESTIMATE)
    }

    /// Expected average gas rate paid per transaction: base fee plus the
    /// historical average tip, rounded up to integer wei.
    pub async fn expected_transaction_gas_rate(&self) -> GasResult<Wei> {
        let base_fee = self.oracle.base_fee_per_gas().await?;
        Ok((base_fee + Wei::new(AVG_MAX_PRIORITY_FEE_PER_GAS)).ceil())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GasError;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;

    struct FixedOracle {
        base_fee: Wei,
        instant_tip: Wei,
    }

    #[async_trait]
    impl GasOracle for FixedOracle {
        async fn base_fee_per_gas(&self) -> GasResult<Wei> {
            Ok(self.base_fee)
        }

        async fn max_priority_fee_per_gas(&self, _urgency: Urgency) -> GasResult<Wei> {
            Ok(self.instant_tip)
        }
    }

    struct FailingOracle;

    #[async_trait]
    impl GasOracle for FailingOracle {
        async fn base_fee_per_gas(&self) -> GasResult<Wei> {
            Err(GasError::Oracle("timed out".to_string()))
        }

        async fn max_priority_fee_per_gas(&self, _urgency: Urgency) -> GasResult<Wei> {
            Err(GasError::Oracle("timed out".to_string()))
        }
    }

    fn attendant() -> GasStationAttendant<FixedOracle> {
        GasStationAttendant::new(FixedOracle {
            base_fee: Wei::from_gwei(dec!(100)),
            instant_tip: Wei::from_gwei(dec!(2)),
        })
    }

    #[tokio::test]
    async fn test_first_bid_through_oracle() {
        let bid = attendant().next_bid_with_oracle(None).await.unwrap().unwrap();
        assert_eq!(bid.max_fee_per_gas, Wei::from_gwei(dec!(202)));
        assert_eq!(bid.max_priority_fee_per_gas, Wei::from_gwei(dec!(2)));
    }

    #[tokio::test]
    async fn test_oracle_failure_is_an_error_not_a_stop() {
        let attendant = GasStationAttendant::new(FailingOracle);
        let result = attendant.next_bid_with_oracle(None).await;
        assert!(matches!(result, Err(GasError::Oracle(_))));
    }

    #[tokio::test]
    async fn test_expected_gas_rate_adds_average_tip() {
        let rate = attendant().expected_transaction_gas_rate().await.unwrap();
        assert_eq!(rate, Wei::new(dec!(102_750_000_000)));
    }

    #[tokio::test]
    async fn test_worker_balance_pads_base_fee() {
        let balance = attendant().worker_balance_for_trade().await.unwrap();
        // (100 gwei * 1.771561 + 2 gwei) * 225_000
        let expected = (Wei::from_gwei(dec!(100)) * dec!(1.771561)
            + Wei::from_gwei(dec!(2)))
            * dec!(225_000);
        assert_eq!(balance, expected);
    }

    #[test]
    fn test_safe_balance_constant() {
        assert_eq!(
            attendant().safe_balance_for_trade(),
            Wei::new(dec!(82_500_000_000_000_000))
        );
    }
}

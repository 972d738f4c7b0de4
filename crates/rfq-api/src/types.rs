//! Typed request parameters and response payloads.
//!
//! All monetary values are `rust_decimal::Decimal` and serialize as
//! canonical strings. Absent and zero amounts are distinct states and
//! stay distinct (`Option<Decimal>`).

use rfq_core::{ChainId, Integrator, MarketOperation, TokenAddress};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Market-maker offering allowlist: maker URI to tradable pairs.
pub type OfferingAllowlist = HashMap<String, Vec<(String, String)>>;

/// Fully validated quote parameters handed to a per-chain service.
///
/// Produced only by the admission pipeline; holding one implies the
/// request passed chain, integrator, schema and domain validation.
#[derive(Debug, Clone)]
pub struct FetchQuoteParams {
    pub chain_id: ChainId,
    pub integrator: Integrator,
    /// Token the maker supplies (the bought asset).
    pub maker_token: TokenAddress,
    /// Token the taker supplies (the sold asset).
    pub taker_token: TokenAddress,
    pub maker_token_decimals: u8,
    pub taker_token_decimals: u8,
    pub market_operation: MarketOperation,
    /// Exactly one of these is set; which one determines the side on
    /// amount-addressed flows.
    pub buy_amount: Option<Decimal>,
    pub sell_amount: Option<Decimal>,
    pub taker_address: Option<String>,
    pub tx_origin: Option<String>,
    /// Restricts which market makers may serve the request.
    pub offerings: Option<OfferingAllowlist>,
    /// Caller-supplied gas price override, in wei.
    pub gas_price: Option<Decimal>,
    pub check_approval: bool,
}

impl FetchQuoteParams {
    /// The fill amount, whichever side carries it.
    pub fn fill_amount(&self) -> Decimal {
        self.buy_amount.or(self.sell_amount).unwrap_or(Decimal::ZERO)
    }
}

/// Indicative price payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceResponse {
    pub price: Decimal,
    pub buy_amount: Decimal,
    pub sell_amount: Decimal,
    pub buy_token_address: TokenAddress,
    pub sell_token_address: TokenAddress,
    pub gas: Decimal,
    /// Benchmark for market makers to beat; absent when not computable.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub comparison_price: Option<Decimal>,
}

/// Firm quote payload: an indicative price plus the signed order to fill.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    #[serde(flatten)]
    pub price: PriceResponse,
    /// Opaque signed-order envelope; its encoding belongs to the
    /// per-chain service.
    pub order: serde_json::Value,
    pub order_hash: String,
    #[serde(rename = "type")]
    pub kind: TradeKind,
}

/// Recognized trade envelope kinds on the submit flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeKind {
    #[serde(rename = "otc")]
    Otc,
    #[serde(rename = "metatransaction")]
    MetaTransaction,
}

/// Validated submit parameters. Trade and approval envelopes stay
/// opaque; signature verification is the service's concern.
#[derive(Debug, Clone)]
pub struct SubmitParams {
    pub kind: TradeKind,
    pub trade: serde_json::Value,
    pub approval: Option<serde_json::Value>,
}

/// Receipt for an accepted submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitReceipt {
    #[serde(rename = "type")]
    pub kind: TradeKind,
    pub hash: String,
}

/// Status payload for a submitted trade.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub status: String,
    pub transactions: Vec<StatusTransaction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusTransaction {
    pub hash: String,
    pub timestamp_ms: i64,
}

/// Result of a chain's health check. Cached for 30 seconds per chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckResult {
    pub is_operational: bool,
    /// Tradable pairs, as (tokenA, tokenB) addresses.
    pub pairs: Vec<(TokenAddress, TokenAddress)>,
    pub issues: Vec<HealthIssue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthIssue {
    pub status: HealthIssueStatus,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthIssueStatus {
    Operational,
    Degraded,
    Failed,
    Maintenance,
}

/// Short-form health payload served to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortHealthResponse {
    pub is_operational: bool,
    pub pairs: Vec<(TokenAddress, TokenAddress)>,
}

impl From<&HealthCheckResult> for ShortHealthResponse {
    fn from(result: &HealthCheckResult) -> Self {
        Self {
            is_operational: result.is_operational,
            pairs: result.pairs.clone(),
        }
    }
}

/// Price endpoint response wrapper: liquidity may simply be unavailable.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidityResponse<T: Serialize> {
    pub liquidity_available: bool,
    #[serde(flatten)]
    pub payload: Option<T>,
}

impl<T: Serialize> LiquidityResponse<T> {
    pub fn from_option(payload: Option<T>) -> Self {
        Self {
            liquidity_available: payload.is_some(),
            payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_price_response_serializes_decimals_as_strings() {
        let response = PriceResponse {
            price: dec!(1.5),
            buy_amount: dec!(1234),
            sell_amount: dec!(9876),
            buy_token_address: TokenAddress::parse(
                "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2",
            )
            .unwrap(),
            sell_token_address: TokenAddress::parse(
                "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48",
            )
            .unwrap(),
            gas: dec!(100000),
            comparison_price: None,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["price"], "1.5");
        assert_eq!(json["buyAmount"], "1234");
        assert!(json.get("comparisonPrice").is_none());
    }

    #[test]
    fn test_liquidity_response_flags_absence() {
        let empty: LiquidityResponse<PriceResponse> = LiquidityResponse::from_option(None);
        let json = serde_json::to_value(&empty).unwrap();
        assert_eq!(json["liquidityAvailable"], false);
        assert!(json.get("price").is_none());
    }

    #[test]
    fn test_trade_kind_wire_names() {
        assert_eq!(serde_json::to_value(TradeKind::Otc).unwrap(), "otc");
        assert_eq!(
            serde_json::to_value(TradeKind::MetaTransaction).unwrap(),
            "metatransaction"
        );
    }
}

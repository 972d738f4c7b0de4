//! Per-chain swap service backed by an upstream quote server.
//!
//! Translates validated quote parameters into upstream HTTP calls and
//! enriches indicative prices with a locally computed comparison price.

use crate::error::AppResult;
use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::StatusCode;
use rfq_api::error::ServiceError;
use rfq_api::types::{
    FetchQuoteParams, HealthCheckResult, PriceResponse, QuoteResponse, StatusResponse,
    SubmitParams, SubmitReceipt,
};
use rfq_api::{SwapService, TokenRegistry};
use rfq_core::decimal::to_unit_amount;
use rfq_core::{ChainId, MarketOperation, TokenAddress};
use rfq_gas::{GasStationAttendant, HttpGasOracle};
use rfq_pricing::{comparison_price, LiquiditySource, MarketSideLiquidity, NativeOrderType};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Gas to fill a single native RFQ order.
const NATIVE_ORDER_FILL_GAS: Decimal = dec!(100_000);
/// Exchange overhead of routing through a native order.
const EXCHANGE_OVERHEAD_GAS: Decimal = dec!(20_000);

/// Upstream rejection reason that maps to "no liquidity" rather than a
/// client error.
const INSUFFICIENT_ASSET_LIQUIDITY: &str = "INSUFFICIENT_ASSET_LIQUIDITY";

/// Swap service for one chain, backed by an upstream quote server and a
/// gas oracle.
pub struct UpstreamSwapService {
    http: reqwest::Client,
    quote_url: String,
    chain_id: ChainId,
    tokens: Arc<TokenRegistry>,
    attendant: GasStationAttendant<HttpGasOracle>,
}

impl UpstreamSwapService {
    pub fn new(
        chain_id: ChainId,
        quote_url: impl Into<String>,
        gas_oracle_url: &str,
        tokens: Arc<TokenRegistry>,
    ) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()?;
        let oracle = HttpGasOracle::new(gas_oracle_url)?;
        Ok(Self {
            http,
            quote_url: quote_url.into(),
            chain_id,
            tokens,
            attendant: GasStationAttendant::new(oracle),
        })
    }

    fn request_body<'a>(&self, params: &'a FetchQuoteParams) -> UpstreamQuoteRequest<'a> {
        UpstreamQuoteRequest {
            chain_id: self.chain_id,
            integrator_id: &params.integrator.integrator_id,
            buy_token: &params.maker_token,
            sell_token: &params.taker_token,
            buy_amount: params.buy_amount,
            sell_amount: params.sell_amount,
            taker_address: params.taker_address.as_deref(),
            tx_origin: params.tx_origin.as_deref(),
            gas_price: params.gas_price,
            check_approval: params.check_approval,
        }
    }

    /// POST to an upstream quote endpoint and decode the response.
    ///
    /// A 400 carrying an `INSUFFICIENT_ASSET_LIQUIDITY` validation item
    /// means the upstream has no liquidity for the pair; that is a valid
    /// outcome, not an error. Other 4xx responses are the client's
    /// fault and surface as such; everything else is opaque.
    async fn post_quote<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &FetchQuoteParams,
    ) -> Result<Option<T>, ServiceError> {
        let url = format!("{}{path}", self.quote_url);
        let response = self
            .http
            .post(&url)
            .json(&self.request_body(params))
            .send()
            .await
            .map_err(|e| ServiceError::Other(anyhow!("upstream request failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            let payload = response
                .json::<T>()
                .await
                .map_err(|e| ServiceError::Other(anyhow!("malformed upstream response: {e}")))?;
            return Ok(Some(payload));
        }

        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::BAD_REQUEST {
            if let Ok(error) = serde_json::from_str::<UpstreamErrorBody>(&body) {
                if error
                    .validation_errors
                    .iter()
                    .any(|item| item.reason == INSUFFICIENT_ASSET_LIQUIDITY)
                {
                    return Ok(None);
                }
                if !error.error.is_empty() {
                    return Err(ServiceError::ClientCaused(error.error));
                }
            }
        }
        if status.is_client_error() {
            return Err(ServiceError::ClientCaused(format!(
                "upstream rejected request with status {status}"
            )));
        }
        Err(ServiceError::Other(anyhow!(
            "upstream returned status {status}: {body}"
        )))
    }

    /// Compute and attach the comparison price for an indicative price.
    ///
    /// Degrades to no comparison price when the gas oracle is down or
    /// the upstream omitted token-to-ETH rates.
    async fn attach_comparison_price(
        &self,
        params: &FetchQuoteParams,
        price: &mut PriceResponse,
        sell_token_to_eth_rate: Option<Decimal>,
        buy_token_to_eth_rate: Option<Decimal>,
    ) {
        let gas_rate = match self.attendant.expected_transaction_gas_rate().await {
            Ok(rate) => rate,
            Err(error) => {
                warn!(chain_id = %self.chain_id, error = %error, "gas oracle unavailable, skipping comparison price");
                return;
            }
        };

        // Input is the sell (taker) token for sells, the buy (maker)
        // token for buys. Rates arrive in token units per ETH and the
        // calculator works in base units.
        let maker_pow = pow10(params.maker_token_decimals);
        let taker_pow = pow10(params.taker_token_decimals);
        let (input_rate, output_rate, input_pow, output_pow) = match params.market_operation {
            MarketOperation::Sell => (
                sell_token_to_eth_rate,
                buy_token_to_eth_rate,
                taker_pow,
                maker_pow,
            ),
            MarketOperation::Buy => (
                buy_token_to_eth_rate,
                sell_token_to_eth_rate,
                maker_pow,
                taker_pow,
            ),
        };
        let Some(input_rate) = input_rate else {
            return;
        };

        let liquidity = MarketSideLiquidity {
            side: params.market_operation,
            input_amount_per_eth: input_rate * input_pow,
            output_amount_per_eth: output_rate.unwrap_or(Decimal::ZERO) * output_pow,
            maker_token_decimals: params.maker_token_decimals,
            taker_token_decimals: params.taker_token_decimals,
        };

        let adjusted_rate = price.price * maker_pow / taker_pow;
        let amount = params.fill_amount() * input_pow;
        let fee_in_eth = to_unit_amount(gas_rate.0, 18);

        price.comparison_price = comparison_price(
            adjusted_rate,
            amount,
            &liquidity,
            &|_: NativeOrderType| Ok(fee_in_eth * NATIVE_ORDER_FILL_GAS),
            &|_: LiquiditySource| Ok(fee_in_eth * EXCHANGE_OVERHEAD_GAS),
        );
    }
}

#[async_trait]
impl SwapService for UpstreamSwapService {
    async fn fetch_indicative_price(
        &self,
        params: FetchQuoteParams,
    ) -> Result<Option<PriceResponse>, ServiceError> {
        let upstream = self
            .post_quote::<UpstreamPrice>("/prices", &params)
            .await?;
        let Some(upstream) = upstream else {
            return Ok(None);
        };

        let mut price = upstream.price;
        self.attach_comparison_price(
            &params,
            &mut price,
            upstream.sell_token_to_eth_rate,
            upstream.buy_token_to_eth_rate,
        )
        .await;
        Ok(Some(price))
    }

    async fn fetch_firm_quote(
        &self,
        params: FetchQuoteParams,
    ) -> Result<Option<QuoteResponse>, ServiceError> {
        let upstream = self
            .post_quote::<UpstreamQuote>("/quotes", &params)
            .await?;
        let Some(upstream) = upstream else {
            return Ok(None);
        };

        let mut quote = upstream.quote;
        self.attach_comparison_price(
            &params,
            &mut quote.price,
            upstream.sell_token_to_eth_rate,
            upstream.buy_token_to_eth_rate,
        )
        .await;
        Ok(Some(quote))
    }

    async fn run_health_check(&self) -> Result<HealthCheckResult, ServiceError> {
        let url = format!("{}/healthz", self.quote_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ServiceError::Other(anyhow!("health check request failed: {e}")))?;
        if !response.status().is_success() {
            return Err(ServiceError::Other(anyhow!(
                "health check returned status {}",
                response.status()
            )));
        }
        response
            .json::<HealthCheckResult>()
            .await
            .map_err(|e| ServiceError::Other(anyhow!("malformed health response: {e}")))
    }

    async fn get_token_decimals(&self, token: &str) -> Result<u8, ServiceError> {
        if let Some(metadata) = self.tokens.metadata_for_symbol(token, self.chain_id) {
            return Ok(metadata.decimals);
        }
        if let Ok(address) = TokenAddress::parse(token) {
            if let Some(metadata) = self.tokens.metadata_for_address(&address, self.chain_id) {
                return Ok(metadata.decimals);
            }
        }
        Err(ServiceError::ClientCaused(format!(
            "Token {token} is currently unsupported"
        )))
    }

    async fn submit(
        &self,
        params: SubmitParams,
        integrator_id: &str,
    ) -> Result<SubmitReceipt, ServiceError> {
        let url = format!("{}/submit", self.quote_url);
        let body = UpstreamSubmitRequest {
            chain_id: self.chain_id,
            integrator_id,
            kind: params.kind,
            trade: params.trade,
            approval: params.approval,
        };
        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ServiceError::Other(anyhow!("submit request failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<SubmitReceipt>()
                .await
                .map_err(|e| ServiceError::Other(anyhow!("malformed submit response: {e}")));
        }
        let body = response.text().await.unwrap_or_default();
        if status.is_client_error() {
            return Err(ServiceError::ClientCaused(format!(
                "submission rejected: {body}"
            )));
        }
        Err(ServiceError::Other(anyhow!(
            "submit returned status {status}: {body}"
        )))
    }

    async fn get_status(&self, hash: &str) -> Result<Option<StatusResponse>, ServiceError> {
        let url = format!("{}/status/{hash}", self.quote_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ServiceError::Other(anyhow!("status request failed: {e}")))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(ServiceError::Other(anyhow!(
                "status returned status {}",
                response.status()
            )));
        }
        response
            .json::<StatusResponse>()
            .await
            .map(Some)
            .map_err(|e| ServiceError::Other(anyhow!("malformed status response: {e}")))
    }
}

fn pow10(decimals: u8) -> Decimal {
    Decimal::from_i128_with_scale(10i128.pow(decimals as u32), 0)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpstreamQuoteRequest<'a> {
    chain_id: ChainId,
    integrator_id: &'a str,
    buy_token: &'a TokenAddress,
    sell_token: &'a TokenAddress,
    #[serde(skip_serializing_if = "Option::is_none")]
    buy_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sell_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    taker_address: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tx_origin: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gas_price: Option<Decimal>,
    check_approval: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpstreamSubmitRequest<'a> {
    chain_id: ChainId,
    integrator_id: &'a str,
    #[serde(rename = "type")]
    kind: rfq_api::types::TradeKind,
    trade: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    approval: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpstreamPrice {
    #[serde(flatten)]
    price: PriceResponse,
    #[serde(default)]
    sell_token_to_eth_rate: Option<Decimal>,
    #[serde(default)]
    buy_token_to_eth_rate: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpstreamQuote {
    #[serde(flatten)]
    quote: QuoteResponse,
    #[serde(default)]
    sell_token_to_eth_rate: Option<Decimal>,
    #[serde(default)]
    buy_token_to_eth_rate: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct UpstreamErrorBody {
    error: String,
    validation_errors: Vec<UpstreamValidationItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpstreamValidationItem {
    #[serde(default)]
    reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_error_body_parses_liquidity_rejection() {
        let body = r#"{
            "error": "Validation Failed",
            "validationErrors": [
                { "field": "sellAmount", "code": 1004, "reason": "INSUFFICIENT_ASSET_LIQUIDITY" }
            ]
        }"#;
        let parsed: UpstreamErrorBody = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.validation_errors.len(), 1);
        assert_eq!(
            parsed.validation_errors[0].reason,
            INSUFFICIENT_ASSET_LIQUIDITY
        );
    }

    #[test]
    fn test_upstream_price_flattens_rates() {
        let body = r#"{
            "price": "1800.55",
            "buyAmount": "1800.55",
            "sellAmount": "1",
            "buyTokenAddress": "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48",
            "sellTokenAddress": "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2",
            "gas": "225000",
            "sellTokenToEthRate": "1",
            "buyTokenToEthRate": "1800"
        }"#;
        let parsed: UpstreamPrice = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.price.price, dec!(1800.55));
        assert_eq!(parsed.buy_token_to_eth_rate, Some(dec!(1800)));
        assert!(parsed.price.comparison_price.is_none());
    }
}

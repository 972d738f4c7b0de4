//! Request parameter extraction and validation.
//!
//! Ordering here is deliberate: the chain resolves from its header
//! before any body content is interpreted (token resolution depends on
//! the chain), the required-field sweep runs before domain checks, and
//! nothing dispatches until every check has passed.

use crate::error::{ApiError, ValidationErrorCode};
use crate::integrators::IntegratorDirectory;
use crate::service::{ServiceDirectory, SwapService};
use crate::tokens::TokenRegistry;
use crate::types::{FetchQuoteParams, OfferingAllowlist, SubmitParams, TradeKind};
use axum::http::HeaderMap;
use rfq_core::{is_address, ChainId, Integrator, MarketOperation, TokenAddress};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;

/// Header carrying the target chain. Required on every endpoint.
pub const CHAIN_ID_HEADER: &str = "0x-chain-id";
/// Header carrying the API key on execution/gasless flows.
pub const API_KEY_HEADER: &str = "0x-api-key";

/// Resolve the chain ID from the request header.
pub fn extract_chain_id(
    headers: &HeaderMap,
    services: &ServiceDirectory,
) -> Result<ChainId, ApiError> {
    let raw = headers
        .get(CHAIN_ID_HEADER)
        .ok_or_else(|| {
            ApiError::validation(
                CHAIN_ID_HEADER,
                ValidationErrorCode::RequiredField,
                "Request must include a chain ID header",
            )
        })?
        .to_str()
        .map_err(|_| invalid_chain_id())?;

    let chain_id = ChainId::from_str(raw).map_err(|_| invalid_chain_id())?;

    if !services.contains(chain_id) {
        return Err(ApiError::validation(
            CHAIN_ID_HEADER,
            ValidationErrorCode::FieldInvalid,
            "No configuration exists for chain",
        ));
    }
    Ok(chain_id)
}

fn invalid_chain_id() -> ApiError {
    ApiError::validation(
        CHAIN_ID_HEADER,
        ValidationErrorCode::FieldInvalid,
        "Chain ID is invalid",
    )
}

/// Validate the API key header and resolve its integrator, enforcing
/// the chain entitlement.
pub fn validate_api_key(
    headers: &HeaderMap,
    chain_id: ChainId,
    integrators: &IntegratorDirectory,
) -> Result<Integrator, ApiError> {
    let api_key = headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::InvalidApiKey("Must access with an API key".to_string()))?;

    if !integrators.api_key_whitelist().contains(api_key) {
        return Err(ApiError::InvalidApiKey(
            "API key not authorized for gasless access".to_string(),
        ));
    }
    let integrator_id = integrators.integrator_id_for_api_key(api_key).ok_or_else(|| {
        // With a valid configuration this should never happen.
        ApiError::InvalidApiKey("API key has no associated Integrator ID".to_string())
    })?;
    let integrator = integrators
        .get_integrator_by_id(integrator_id)
        .cloned()
        .ok_or_else(|| {
            ApiError::InvalidApiKey("API key has no associated Integrator ID".to_string())
        })?;
    if !integrator.allows_chain(chain_id) {
        return Err(ApiError::InvalidApiKey(format!(
            "API Key not authorized to access chain {chain_id}"
        )));
    }
    Ok(integrator)
}

fn missing_parameters(fields: Vec<&str>) -> ApiError {
    let joined = fields.join(", ");
    ApiError::validation(
        joined.clone(),
        ValidationErrorCode::RequiredField,
        format!("The request is missing parameters: {joined}"),
    )
}

fn unsupported_token(field: &str, raw: &str) -> ApiError {
    ApiError::validation(
        field,
        ValidationErrorCode::AddressNotSupported,
        format!("Token {raw} is currently unsupported"),
    )
}

fn parse_amount(raw: &str, field: &str) -> Result<Decimal, ApiError> {
    Decimal::from_str(raw).map_err(|_| {
        ApiError::validation(
            field,
            ValidationErrorCode::IncorrectFormat,
            format!("'{raw}' is not a valid amount"),
        )
    })
}

/// Resolve a raw token string (symbol or address) to a canonical
/// address and its decimals on the target chain.
async fn resolve_token(
    raw: &str,
    field: &str,
    chain_id: ChainId,
    tokens: &TokenRegistry,
    service: &Arc<dyn SwapService>,
) -> Result<(TokenAddress, u8), ApiError> {
    let address = if raw.to_ascii_lowercase().starts_with("0x") {
        TokenAddress::parse(raw).map_err(|_| unsupported_token(field, raw))?
    } else {
        tokens
            .address_for_symbol(raw, chain_id)
            .ok_or_else(|| unsupported_token(field, raw))?
    };
    let decimals = service
        .get_token_decimals(raw)
        .await
        .map_err(|_| unsupported_token(field, raw))?;
    Ok((address, decimals))
}

/// Query parameters shared by the gasless price and quote endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuoteRequestQuery {
    pub buy_token: Option<String>,
    pub sell_token: Option<String>,
    pub buy_amount: Option<String>,
    pub sell_amount: Option<String>,
    pub taker_address: Option<String>,
    pub affiliate_address: Option<String>,
    pub gas_price: Option<String>,
    pub check_approval: Option<String>,
}

/// Parse and validate a gasless-family quote request.
///
/// `firm` adds the firm-quote requirements: a valid taker address and
/// the optional approval check flag.
pub async fn parse_quote_params(
    chain_id: ChainId,
    integrator: Integrator,
    query: &QuoteRequestQuery,
    tokens: &TokenRegistry,
    service: &Arc<dyn SwapService>,
    firm: bool,
) -> Result<FetchQuoteParams, ApiError> {
    // Schema: required-field sweep, naming every offender.
    let mut missing = Vec::new();
    if query.buy_token.is_none() {
        missing.push("buyToken");
    }
    if query.sell_token.is_none() {
        missing.push("sellToken");
    }
    if firm && query.taker_address.is_none() {
        missing.push("takerAddress");
    }
    if query.buy_amount.is_none() && query.sell_amount.is_none() {
        missing.push("buyAmount or sellAmount");
    }
    if !missing.is_empty() {
        return Err(missing_parameters(missing));
    }

    if query.buy_amount.is_some() && query.sell_amount.is_some() {
        return Err(ApiError::validation(
            "buyAmount, sellAmount",
            ValidationErrorCode::FieldInvalid,
            "Exactly one of buyAmount and sellAmount must be provided",
        ));
    }

    let buy_token_raw = query.buy_token.as_deref().unwrap_or_default();
    let sell_token_raw = query.sell_token.as_deref().unwrap_or_default();

    // Selling the unwrapped native asset is not supported; point the
    // caller at the wrapped equivalent.
    if tokens.is_native_symbol_or_address(sell_token_raw, chain_id) {
        let wrapped = tokens.wrapped_native_symbol(chain_id).unwrap_or("the wrapped token");
        return Err(ApiError::validation(
            "sellToken",
            ValidationErrorCode::TokenNotSupported,
            format!("Unwrapped Native Asset is not supported. Use {wrapped} instead"),
        ));
    }

    let (buy_token, buy_token_decimals) =
        resolve_token(buy_token_raw, "buyToken", chain_id, tokens, service).await?;
    let (sell_token, sell_token_decimals) =
        resolve_token(sell_token_raw, "sellToken", chain_id, tokens, service).await?;

    // Absent and zero are distinct states; both survive parsing.
    let buy_amount = match &query.buy_amount {
        Some(raw) => Some(parse_amount(raw, "buyAmount")?),
        None => None,
    };
    let sell_amount = match &query.sell_amount {
        Some(raw) => Some(parse_amount(raw, "sellAmount")?),
        None => None,
    };

    let taker_address = query.taker_address.clone();
    if firm {
        let taker = taker_address.as_deref().unwrap_or_default();
        if !is_address(taker) {
            return Err(ApiError::validation(
                "takerAddress",
                ValidationErrorCode::InvalidAddress,
                "Must provide a valid takerAddress",
            ));
        }
    }

    let gas_price = match &query.gas_price {
        Some(raw) => Some(parse_amount(raw, "gasPrice")?),
        None => None,
    };

    let market_operation = if buy_amount.is_some() {
        MarketOperation::Buy
    } else {
        MarketOperation::Sell
    };

    Ok(FetchQuoteParams {
        chain_id,
        integrator,
        // The buy token is what the maker supplies; the sell token is
        // what the taker gives up.
        maker_token: buy_token,
        taker_token: sell_token,
        maker_token_decimals: buy_token_decimals,
        taker_token_decimals: sell_token_decimals,
        market_operation,
        buy_amount,
        sell_amount,
        taker_address,
        tx_origin: None,
        offerings: None,
        gas_price,
        check_approval: firm && query.check_approval.as_deref() == Some("true"),
    })
}

/// Body of an RFQ-family price or quote request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RfqtRequestBody {
    pub maker_token: Option<String>,
    pub taker_token: Option<String>,
    pub market_operation: Option<String>,
    pub asset_fill_amount: Option<String>,
    pub taker_address: Option<String>,
    pub tx_origin: Option<String>,
    pub integrator_id: Option<String>,
    pub alt_rfq_asset_offerings: Option<OfferingAllowlist>,
    pub intent_on_filling: Option<bool>,
}

/// Parse and validate an RFQ-family request addressed by integrator ID.
pub async fn parse_rfqt_params(
    chain_id: ChainId,
    body: &RfqtRequestBody,
    integrators: &IntegratorDirectory,
    tokens: &TokenRegistry,
    service: &Arc<dyn SwapService>,
) -> Result<FetchQuoteParams, ApiError> {
    let mut missing = Vec::new();
    if body.maker_token.is_none() {
        missing.push("makerToken");
    }
    if body.taker_token.is_none() {
        missing.push("takerToken");
    }
    if body.market_operation.is_none() {
        missing.push("marketOperation");
    }
    if body.asset_fill_amount.is_none() {
        missing.push("assetFillAmount");
    }
    if body.taker_address.is_none() {
        missing.push("takerAddress");
    }
    if body.tx_origin.is_none() {
        missing.push("txOrigin");
    }
    if body.integrator_id.is_none() {
        missing.push("integratorId");
    }
    if !missing.is_empty() {
        return Err(missing_parameters(missing));
    }

    let integrator_id = body.integrator_id.as_deref().unwrap_or_default();
    let integrator = integrators
        .get_integrator_by_id(integrator_id)
        .cloned()
        .ok_or_else(|| {
            ApiError::BadRequest(format!(
                "No integrator found for integrator ID {integrator_id}"
            ))
        })?;
    if !integrator.allows_chain(chain_id) {
        return Err(ApiError::validation(
            "integratorId",
            ValidationErrorCode::FieldInvalid,
            format!("Integrator {integrator_id} is not authorized for chain {chain_id}"),
        ));
    }

    let market_operation = match body.market_operation.as_deref() {
        Some("Buy") => MarketOperation::Buy,
        Some("Sell") => MarketOperation::Sell,
        other => {
            let raw = other.unwrap_or_default();
            return Err(ApiError::validation(
                "marketOperation",
                ValidationErrorCode::FieldInvalid,
                format!("'{raw}' is an invalid market operation"),
            ));
        }
    };

    let fill_amount = parse_amount(
        body.asset_fill_amount.as_deref().unwrap_or_default(),
        "assetFillAmount",
    )?;

    let (maker_token, maker_token_decimals) = resolve_token(
        body.maker_token.as_deref().unwrap_or_default(),
        "makerToken",
        chain_id,
        tokens,
        service,
    )
    .await?;
    let (taker_token, taker_token_decimals) = resolve_token(
        body.taker_token.as_deref().unwrap_or_default(),
        "takerToken",
        chain_id,
        tokens,
        service,
    )
    .await?;

    let (buy_amount, sell_amount) = match market_operation {
        MarketOperation::Buy => (Some(fill_amount), None),
        MarketOperation::Sell => (None, Some(fill_amount)),
    };

    Ok(FetchQuoteParams {
        chain_id,
        integrator,
        maker_token,
        taker_token,
        maker_token_decimals,
        taker_token_decimals,
        market_operation,
        buy_amount,
        sell_amount,
        taker_address: body.taker_address.clone(),
        tx_origin: body.tx_origin.clone(),
        offerings: body.alt_rfq_asset_offerings.clone(),
        gas_price: None,
        check_approval: false,
    })
}

/// Body of a gasless submit request. Trade and approval payloads stay
/// opaque beyond the envelope kind.
#[derive(Debug, Default, Deserialize)]
pub struct SubmitRequestBody {
    pub trade: Option<SubmitTradeBody>,
    pub approval: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitTradeBody {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(flatten)]
    pub envelope: serde_json::Value,
}

/// Recognized approval envelope kinds.
const APPROVAL_KINDS: &[&str] = &["permit", "executeMetaTransaction"];

/// Parse and validate a submit request body.
pub fn parse_submit_params(body: SubmitRequestBody) -> Result<SubmitParams, ApiError> {
    let trade = body.trade.ok_or_else(|| missing_parameters(vec!["trade"]))?;

    let kind = match trade.kind.as_deref() {
        Some("otc") => TradeKind::Otc,
        Some("metatransaction") => TradeKind::MetaTransaction,
        other => {
            let raw = other.unwrap_or_default();
            return Err(ApiError::validation(
                "type",
                ValidationErrorCode::FieldInvalid,
                format!("{raw} is an invalid value for Trade 'type'"),
            ));
        }
    };

    // The approval envelope stays opaque past its kind, but the kind
    // must be one we know how to execute.
    if let Some(approval) = &body.approval {
        let approval_kind = approval
            .get("type")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default();
        if !APPROVAL_KINDS.contains(&approval_kind) {
            return Err(ApiError::validation(
                "type",
                ValidationErrorCode::FieldInvalid,
                format!("{approval_kind} is an invalid value for Approval 'type'"),
            ));
        }
    }

    Ok(SubmitParams {
        kind,
        trade: trade.envelope,
        approval: body.approval,
    })
}

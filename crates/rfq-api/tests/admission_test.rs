//! End-to-end admission tests over the full axum router.
//!
//! Each request is driven through `tower::ServiceExt::oneshot` against
//! a stub per-chain service that counts how often it is invoked, so the
//! tests can assert both the HTTP surface and the no-dispatch-on-reject
//! property.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use http_body_util::BodyExt;
use rfq_api::error::ServiceError;
use rfq_api::types::{
    FetchQuoteParams, HealthCheckResult, PriceResponse, QuoteResponse, StatusResponse,
    StatusTransaction, SubmitParams, SubmitReceipt, TradeKind,
};
use rfq_api::{
    create_router, AppState, IntegratorDirectory, ServiceDirectory, SwapService, TokenRegistry,
};
use rfq_core::{ChainId, Integrator, TokenAddress};
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

const CHAIN: u64 = 1337;
const WETH: &str = "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2";
const USDC: &str = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48";
const TAKER: &str = "0xf003a9418de2620f935181259c0fa1594e8c0af3";

/// Stub swap service that records invocation counts.
struct RecordingService {
    price_calls: AtomicUsize,
    quote_calls: AtomicUsize,
    health_calls: AtomicUsize,
    submit_calls: AtomicUsize,
}

impl RecordingService {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            price_calls: AtomicUsize::new(0),
            quote_calls: AtomicUsize::new(0),
            health_calls: AtomicUsize::new(0),
            submit_calls: AtomicUsize::new(0),
        })
    }

    fn sample_price() -> PriceResponse {
        PriceResponse {
            price: dec!(1800.55),
            buy_amount: dec!(1800.55),
            sell_amount: dec!(1),
            buy_token_address: TokenAddress::parse(USDC).unwrap(),
            sell_token_address: TokenAddress::parse(WETH).unwrap(),
            gas: dec!(225000),
            comparison_price: Some(dec!(1799.32)),
        }
    }
}

#[async_trait]
impl SwapService for RecordingService {
    async fn fetch_indicative_price(
        &self,
        _params: FetchQuoteParams,
    ) -> Result<Option<PriceResponse>, ServiceError> {
        self.price_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Some(Self::sample_price()))
    }

    async fn fetch_firm_quote(
        &self,
        _params: FetchQuoteParams,
    ) -> Result<Option<QuoteResponse>, ServiceError> {
        self.quote_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Some(QuoteResponse {
            price: Self::sample_price(),
            order: json!({ "maker": "0xmaker", "chainId": CHAIN }),
            order_hash: "0xorderhash".to_string(),
            kind: TradeKind::Otc,
        }))
    }

    async fn run_health_check(&self) -> Result<HealthCheckResult, ServiceError> {
        self.health_calls.fetch_add(1, Ordering::SeqCst);
        Ok(HealthCheckResult {
            is_operational: true,
            pairs: vec![(
                TokenAddress::parse(WETH).unwrap(),
                TokenAddress::parse(USDC).unwrap(),
            )],
            issues: vec![],
        })
    }

    async fn get_token_decimals(&self, token: &str) -> Result<u8, ServiceError> {
        if token.eq_ignore_ascii_case(USDC) || token.eq_ignore_ascii_case("USDC") {
            Ok(6)
        } else {
            Ok(18)
        }
    }

    async fn submit(
        &self,
        params: SubmitParams,
        _integrator_id: &str,
    ) -> Result<SubmitReceipt, ServiceError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        Ok(SubmitReceipt {
            kind: params.kind,
            hash: "0xsubmittedhash".to_string(),
        })
    }

    async fn get_status(&self, hash: &str) -> Result<Option<StatusResponse>, ServiceError> {
        if hash == "0xknown" {
            Ok(Some(StatusResponse {
                status: "confirmed".to_string(),
                transactions: vec![StatusTransaction {
                    hash: hash.to_string(),
                    timestamp_ms: 1_700_000_000_000,
                }],
            }))
        } else {
            Ok(None)
        }
    }
}

fn build_state(service: Arc<RecordingService>) -> AppState {
    let mut services = ServiceDirectory::new();
    services.insert(ChainId::new(CHAIN), service);

    let integrators = IntegratorDirectory::from_integrators([Integrator {
        integrator_id: "uuid-integrator-id".to_string(),
        label: "Test Integrator".to_string(),
        api_keys: HashSet::from(["good-key".to_string()]),
        allowed_chain_ids: vec![ChainId::new(CHAIN)],
        rfqm: true,
        plp: false,
    }]);

    let mut tokens = TokenRegistry::new();
    tokens.register_chain(ChainId::new(CHAIN), "ETH", "WETH");
    tokens.insert(
        ChainId::new(CHAIN),
        rfq_api::TokenMetadata {
            symbol: "WETH".to_string(),
            address: TokenAddress::parse(WETH).unwrap(),
            decimals: 18,
        },
    );
    tokens.insert(
        ChainId::new(CHAIN),
        rfq_api::TokenMetadata {
            symbol: "USDC".to_string(),
            address: TokenAddress::parse(USDC).unwrap(),
            decimals: 6,
        },
    );

    AppState::new(services, integrators, tokens)
}

async fn send(state: AppState, request: Request<Body>) -> (StatusCode, Value) {
    let response = create_router(state).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn rfqt_request(chain: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/rfqt/v2/prices")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(chain) = chain {
        builder = builder.header("0x-chain-id", chain);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn full_rfqt_body() -> Value {
    json!({
        "makerToken": USDC,
        "takerToken": WETH,
        "marketOperation": "Sell",
        "assetFillAmount": "1.5",
        "takerAddress": TAKER,
        "txOrigin": TAKER,
        "integratorId": "uuid-integrator-id",
    })
}

fn gasless_request(uri: &str, api_key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header("0x-chain-id", CHAIN.to_string());
    if let Some(key) = api_key {
        builder = builder.header("0x-api-key", key);
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_missing_chain_header_rejected_without_dispatch() {
    let service = RecordingService::new();
    let state = build_state(service.clone());

    let (status, body) = send(state, rfqt_request(None, full_rfqt_body())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Request must include a chain ID header"));
    assert_eq!(service.price_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_malformed_chain_header_rejected() {
    let service = RecordingService::new();
    let state = build_state(service.clone());

    let (status, body) = send(state, rfqt_request(Some("garbage"), full_rfqt_body())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Chain ID is invalid"));
    assert_eq!(service.price_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unregistered_chain_rejected() {
    let service = RecordingService::new();
    let state = build_state(service.clone());

    let (status, body) = send(state, rfqt_request(Some("21"), full_rfqt_body())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("No configuration exists for chain"));
    assert_eq!(service.price_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_missing_fields_reported_together() {
    let service = RecordingService::new();
    let state = build_state(service.clone());

    // Only makerToken present; every other required field is absent.
    let body = json!({ "makerToken": USDC });
    let (status, payload) = send(state, rfqt_request(Some("1337"), body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = payload["error"].as_str().unwrap();
    assert!(message.contains("missing parameters"));
    assert!(message.contains("takerToken"));
    assert!(message.contains("marketOperation"));
    assert!(message.contains("assetFillAmount"));
    assert!(message.contains("integratorId"));
    assert_eq!(service.price_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unknown_integrator_rejected() {
    let service = RecordingService::new();
    let state = build_state(service.clone());

    let mut body = full_rfqt_body();
    body["integratorId"] = json!("nobody-home");
    let (status, payload) = send(state, rfqt_request(Some("1337"), body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(payload["error"]
        .as_str()
        .unwrap()
        .contains("No integrator found for integrator ID nobody-home"));
    assert_eq!(service.price_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_invalid_market_operation_rejected() {
    let service = RecordingService::new();
    let state = build_state(service.clone());

    let mut body = full_rfqt_body();
    body["marketOperation"] = json!("Gamble");
    let (status, payload) = send(state, rfqt_request(Some("1337"), body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(payload["error"]
        .as_str()
        .unwrap()
        .contains("'Gamble' is an invalid market operation"));
    assert_eq!(service.price_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_valid_rfqt_price_dispatches_once() {
    let service = RecordingService::new();
    let state = build_state(service.clone());

    let (status, payload) = send(state, rfqt_request(Some("1337"), full_rfqt_body())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["liquidityAvailable"], json!(true));
    assert_eq!(payload["price"], json!("1800.55"));
    assert_eq!(payload["comparisonPrice"], json!("1799.32"));
    assert_eq!(service.price_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_gasless_price_requires_api_key() {
    let service = RecordingService::new();
    let state = build_state(service.clone());

    let uri = "/gasless/price?buyToken=USDC&sellToken=WETH&sellAmount=1.5".to_string();
    let (status, payload) = send(state, gasless_request(&uri, None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(payload["error"]
        .as_str()
        .unwrap()
        .contains("Must access with an API key"));
    assert_eq!(service.price_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_gasless_price_rejects_unknown_api_key() {
    let service = RecordingService::new();
    let state = build_state(service.clone());

    let uri = "/gasless/price?buyToken=USDC&sellToken=WETH&sellAmount=1.5".to_string();
    let (status, payload) = send(state, gasless_request(&uri, Some("bad-key"))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(payload["error"]
        .as_str()
        .unwrap()
        .contains("API key not authorized for gasless access"));
    assert_eq!(service.price_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_gasless_price_happy_path() {
    let service = RecordingService::new();
    let state = build_state(service.clone());

    let uri = "/gasless/price?buyToken=USDC&sellToken=WETH&sellAmount=1.5".to_string();
    let (status, payload) = send(state, gasless_request(&uri, Some("good-key"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["liquidityAvailable"], json!(true));
    assert_eq!(service.price_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_native_sell_rejected_with_wrapped_hint() {
    let service = RecordingService::new();
    let state = build_state(service.clone());

    let uri = "/gasless/price?buyToken=USDC&sellToken=ETH&sellAmount=1.5".to_string();
    let (status, payload) = send(state, gasless_request(&uri, Some("good-key"))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(payload["error"]
        .as_str()
        .unwrap()
        .contains("Unwrapped Native Asset is not supported. Use WETH instead"));
    assert_eq!(service.price_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unsupported_token_symbol_rejected() {
    let service = RecordingService::new();
    let state = build_state(service.clone());

    let uri = "/gasless/price?buyToken=DOGE2&sellToken=WETH&sellAmount=1.5".to_string();
    let (status, payload) = send(state, gasless_request(&uri, Some("good-key"))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(payload["error"]
        .as_str()
        .unwrap()
        .contains("Token DOGE2 is currently unsupported"));
    assert_eq!(service.price_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_firm_quote_requires_valid_taker_address() {
    let service = RecordingService::new();
    let state = build_state(service.clone());

    let uri = "/gasless/quote?buyToken=USDC&sellToken=WETH&sellAmount=1.5&takerAddress=not-an-address".to_string();
    let (status, payload) = send(state, gasless_request(&uri, Some("good-key"))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(payload["error"]
        .as_str()
        .unwrap()
        .contains("Must provide a valid takerAddress"));
    assert_eq!(service.quote_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_firm_quote_happy_path() {
    let service = RecordingService::new();
    let state = build_state(service.clone());

    let uri = format!(
        "/gasless/quote?buyToken=USDC&sellToken=WETH&sellAmount=1.5&takerAddress={TAKER}"
    );
    let (status, payload) = send(state, gasless_request(&uri, Some("good-key"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["liquidityAvailable"], json!(true));
    assert_eq!(payload["orderHash"], json!("0xorderhash"));
    assert_eq!(payload["type"], json!("otc"));
    assert_eq!(service.quote_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_both_amounts_rejected() {
    let service = RecordingService::new();
    let state = build_state(service.clone());

    let uri =
        "/gasless/price?buyToken=USDC&sellToken=WETH&sellAmount=1.5&buyAmount=2000".to_string();
    let (status, payload) = send(state, gasless_request(&uri, Some("good-key"))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(payload["error"]
        .as_str()
        .unwrap()
        .contains("Exactly one of buyAmount and sellAmount"));
    assert_eq!(service.price_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_submit_returns_created() {
    let service = RecordingService::new();
    let state = build_state(service.clone());

    let body = json!({
        "trade": { "type": "otc", "order": { "maker": "0xmaker" }, "signature": {} }
    });
    let request = Request::builder()
        .method(Method::POST)
        .uri("/gasless/submit")
        .header("0x-chain-id", CHAIN.to_string())
        .header("0x-api-key", "good-key")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, payload) = send(state, request).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(payload["hash"], json!("0xsubmittedhash"));
    assert_eq!(service.submit_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_submit_rejects_unknown_approval_kind_without_dispatch() {
    let service = RecordingService::new();
    let state = build_state(service.clone());

    let body = json!({
        "trade": { "type": "otc", "order": { "maker": "0xmaker" }, "signature": {} },
        "approval": { "type": "bogus", "eip712": {}, "signature": {} }
    });
    let request = Request::builder()
        .method(Method::POST)
        .uri("/gasless/submit")
        .header("0x-chain-id", CHAIN.to_string())
        .header("0x-api-key", "good-key")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, payload) = send(state, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(payload["error"]
        .as_str()
        .unwrap()
        .contains("bogus is an invalid value for Approval 'type'"));
    assert_eq!(service.submit_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_submit_accepts_permit_approval() {
    let service = RecordingService::new();
    let state = build_state(service.clone());

    let body = json!({
        "trade": { "type": "otc", "order": { "maker": "0xmaker" }, "signature": {} },
        "approval": { "type": "permit", "eip712": {}, "signature": {} }
    });
    let request = Request::builder()
        .method(Method::POST)
        .uri("/gasless/submit")
        .header("0x-chain-id", CHAIN.to_string())
        .header("0x-api-key", "good-key")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, _) = send(state, request).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(service.submit_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_healthz_uses_cache_within_ttl() {
    let service = RecordingService::new();
    let state = build_state(service.clone());

    let first = gasless_request("/gasless/healthz", None);
    let second = gasless_request("/gasless/healthz", None);

    let (status, payload) = send(state.clone(), first).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["isOperational"], json!(true));

    let (status, _) = send(state, second).await;
    assert_eq!(status, StatusCode::OK);

    // Second request within the 30s window must not re-run the check.
    assert_eq!(service.health_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_status_found_and_not_found() {
    let service = RecordingService::new();
    let state = build_state(service.clone());

    let (status, payload) = send(
        state.clone(),
        gasless_request("/gasless/status/0xknown", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["status"], json!("confirmed"));

    let (status, _) = send(state, gasless_request("/gasless/status/0xmystery", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

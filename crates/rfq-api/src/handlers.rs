//! Axum handlers for the quote, execution, and health endpoints.

use crate::error::ApiError;
use crate::health::HealthCheckCache;
use crate::integrators::IntegratorDirectory;
use crate::params::{self, QuoteRequestQuery, RfqtRequestBody, SubmitRequestBody};
use crate::service::{ServiceDirectory, SwapService};
use crate::tokens::TokenRegistry;
use crate::types::{LiquidityResponse, ShortHealthResponse};
use axum::extract::{MatchedPath, Path, Query, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use rfq_core::ChainId;
use rfq_telemetry::metrics::{HTTP_REQUESTS_TOTAL, REQUEST_DURATION_MS};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Shared application state for axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<ServiceDirectory>,
    pub integrators: Arc<IntegratorDirectory>,
    pub tokens: Arc<TokenRegistry>,
    pub health_cache: Arc<HealthCheckCache>,
}

impl AppState {
    pub fn new(
        services: ServiceDirectory,
        integrators: IntegratorDirectory,
        tokens: TokenRegistry,
    ) -> Self {
        Self {
            services: Arc::new(services),
            integrators: Arc::new(integrators),
            tokens: Arc::new(tokens),
            health_cache: Arc::new(HealthCheckCache::new()),
        }
    }
}

fn admit_chain(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<(ChainId, Arc<dyn SwapService>), ApiError> {
    let chain_id = params::extract_chain_id(headers, &state.services)?;
    // contains() passed during extraction, so the lookup cannot miss.
    let service = state
        .services
        .get(chain_id)
        .cloned()
        .ok_or_else(|| ApiError::Internal(format!("service for chain {chain_id} vanished")))?;
    Ok((chain_id, service))
}

/// POST /rfqt/v2/prices
pub async fn rfqt_price(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<RfqtRequestBody>,
) -> Result<Response, ApiError> {
    let (chain_id, service) = admit_chain(&state, &headers)?;
    let quote_params =
        params::parse_rfqt_params(chain_id, &body, &state.integrators, &state.tokens, &service)
            .await?;
    let price = service
        .fetch_indicative_price(quote_params)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(LiquidityResponse::from_option(price)).into_response())
}

/// POST /rfqt/v2/quotes
pub async fn rfqt_quote(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<RfqtRequestBody>,
) -> Result<Response, ApiError> {
    let (chain_id, service) = admit_chain(&state, &headers)?;
    let quote_params =
        params::parse_rfqt_params(chain_id, &body, &state.integrators, &state.tokens, &service)
            .await?;
    let quote = service
        .fetch_firm_quote(quote_params)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(LiquidityResponse::from_option(quote)).into_response())
}

/// GET /gasless/price
pub async fn gasless_price(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<QuoteRequestQuery>,
) -> Result<Response, ApiError> {
    let (chain_id, service) = admit_chain(&state, &headers)?;
    let integrator = params::validate_api_key(&headers, chain_id, &state.integrators)?;
    let quote_params =
        params::parse_quote_params(chain_id, integrator, &query, &state.tokens, &service, false)
            .await?;
    let price = service
        .fetch_indicative_price(quote_params)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(LiquidityResponse::from_option(price)).into_response())
}

/// GET /gasless/quote
pub async fn gasless_quote(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<QuoteRequestQuery>,
) -> Result<Response, ApiError> {
    let (chain_id, service) = admit_chain(&state, &headers)?;
    let integrator = params::validate_api_key(&headers, chain_id, &state.integrators)?;
    let quote_params =
        params::parse_quote_params(chain_id, integrator, &query, &state.tokens, &service, true)
            .await?;
    let quote = service
        .fetch_firm_quote(quote_params)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(LiquidityResponse::from_option(quote)).into_response())
}

/// POST /gasless/submit
pub async fn gasless_submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<SubmitRequestBody>,
) -> Result<Response, ApiError> {
    let (chain_id, service) = admit_chain(&state, &headers)?;
    let integrator = params::validate_api_key(&headers, chain_id, &state.integrators)?;
    let submit_params = params::parse_submit_params(body)?;
    let receipt = service
        .submit(submit_params, &integrator.integrator_id)
        .await
        .map_err(ApiError::from)?;
    info!(
        chain_id = %chain_id,
        integrator_id = %integrator.integrator_id,
        hash = %receipt.hash,
        "trade submitted"
    );
    Ok((StatusCode::CREATED, Json(receipt)).into_response())
}

/// GET /gasless/healthz
pub async fn gasless_healthz(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let (chain_id, service) = admit_chain(&state, &headers)?;
    let result = state
        .health_cache
        .get_or_refresh(chain_id, &service)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(ShortHealthResponse::from(&result)).into_response())
}

/// GET /gasless/status/{hash}
pub async fn gasless_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(hash): Path<String>,
) -> Result<Response, ApiError> {
    let (_chain_id, service) = admit_chain(&state, &headers)?;
    let status = service.get_status(&hash).await.map_err(ApiError::from)?;
    match status {
        Some(status) => Ok(Json(status).into_response()),
        None => Err(ApiError::NotFound),
    }
}

/// GET /metrics
pub async fn metrics() -> Response {
    match rfq_telemetry::metrics::gather() {
        Ok(body) => (StatusCode::OK, body).into_response(),
        Err(error) => {
            tracing::error!(error = %error, "failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Per-request counter and latency middleware.
pub async fn track_metrics(request: Request, next: Next) -> Response {
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let started = Instant::now();
    let response = next.run(request).await;
    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

    let status = response.status().as_u16().to_string();
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&endpoint, &status])
        .inc();
    REQUEST_DURATION_MS
        .with_label_values(&[&endpoint])
        .observe(elapsed_ms);

    response
}

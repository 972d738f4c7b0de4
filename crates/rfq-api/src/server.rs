//! HTTP server wiring using axum.

use crate::handlers::{self, AppState};
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use tracing::info;

/// Create the axum router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/rfqt/v2/prices", post(handlers::rfqt_price))
        .route("/rfqt/v2/quotes", post(handlers::rfqt_quote))
        .route("/gasless/price", get(handlers::gasless_price))
        .route("/gasless/quote", get(handlers::gasless_quote))
        .route("/gasless/submit", post(handlers::gasless_submit))
        .route("/gasless/healthz", get(handlers::gasless_healthz))
        .route("/gasless/status/{hash}", get(handlers::gasless_status))
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::from_fn(handlers::track_metrics))
        .with_state(state)
}

/// Run the gateway HTTP server.
pub async fn run_server(
    state: AppState,
    port: u16,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(port, "Starting RFQ gateway server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

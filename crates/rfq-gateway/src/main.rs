//! RFQ liquidity gateway - entry point.

use anyhow::Result;
use clap::Parser;
use rfq_api::{AppState, ServiceDirectory};
use rfq_core::ChainId;
use rfq_gateway::{GatewayConfig, UpstreamSwapService};
use std::sync::Arc;
use tracing::info;

/// RFQ liquidity gateway server
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via RFQ_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    rfq_telemetry::init_logging()?;

    info!("Starting RFQ gateway v{}", env!("CARGO_PKG_VERSION"));

    // Config path: CLI arg > RFQ_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var("RFQ_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    info!(config_path = %config_path, "Loading configuration");
    let config = GatewayConfig::from_file(&config_path)?;

    let tokens = Arc::new(config.build_token_registry()?);
    let integrators = config.build_integrator_directory();

    let mut services = ServiceDirectory::new();
    for chain in &config.chains {
        let chain_id = ChainId::new(chain.chain_id);
        let service = UpstreamSwapService::new(
            chain_id,
            chain.quote_url.clone(),
            &chain.gas_oracle_url,
            tokens.clone(),
        )?;
        services.insert(chain_id, Arc::new(service));
        info!(chain_id = %chain_id, quote_url = %chain.quote_url, "Registered chain");
    }

    let state = AppState {
        services: Arc::new(services),
        integrators: Arc::new(integrators),
        tokens,
        health_cache: Arc::new(rfq_api::HealthCheckCache::new()),
    };

    rfq_api::run_server(state, config.server.port)
        .await
        .map_err(|e| anyhow::anyhow!("server error: {e}"))?;

    Ok(())
}

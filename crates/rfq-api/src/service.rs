//! Per-chain swap service interface and directory.

use crate::error::ServiceError;
use crate::types::{
    FetchQuoteParams, HealthCheckResult, PriceResponse, QuoteResponse, StatusResponse,
    SubmitParams, SubmitReceipt,
};
use async_trait::async_trait;
use rfq_core::ChainId;
use std::collections::HashMap;
use std::sync::Arc;

/// One chain's quote-sourcing and submission service.
///
/// `Ok(None)` from the quote operations means no liquidity is available
/// for the pair; it is not a failure.
#[async_trait]
pub trait SwapService: Send + Sync {
    async fn fetch_indicative_price(
        &self,
        params: FetchQuoteParams,
    ) -> Result<Option<PriceResponse>, ServiceError>;

    async fn fetch_firm_quote(
        &self,
        params: FetchQuoteParams,
    ) -> Result<Option<QuoteResponse>, ServiceError>;

    async fn run_health_check(&self) -> Result<HealthCheckResult, ServiceError>;

    /// Decimals of a token, addressed by symbol or address.
    async fn get_token_decimals(&self, token: &str) -> Result<u8, ServiceError>;

    async fn submit(
        &self,
        params: SubmitParams,
        integrator_id: &str,
    ) -> Result<SubmitReceipt, ServiceError>;

    async fn get_status(&self, hash: &str) -> Result<Option<StatusResponse>, ServiceError>;
}

/// Keyed lookup table of per-chain services, populated at startup.
///
/// Models multi-tenancy without inheritance: no dynamic dispatch beyond
/// the table lookup itself.
#[derive(Default)]
pub struct ServiceDirectory {
    services: HashMap<ChainId, Arc<dyn SwapService>>,
}

impl ServiceDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, chain_id: ChainId, service: Arc<dyn SwapService>) {
        self.services.insert(chain_id, service);
    }

    pub fn get(&self, chain_id: ChainId) -> Option<&Arc<dyn SwapService>> {
        self.services.get(&chain_id)
    }

    pub fn contains(&self, chain_id: ChainId) -> bool {
        self.services.contains_key(&chain_id)
    }

    pub fn chain_ids(&self) -> impl Iterator<Item = ChainId> + '_ {
        self.services.keys().copied()
    }
}

//! Per-chain health-check cache.
//!
//! Health checks fan out to market makers, so results are cached for a
//! short window and shared across callers.

use crate::error::ServiceError;
use crate::service::SwapService;
use crate::types::HealthCheckResult;
use dashmap::DashMap;
use rfq_core::ChainId;
use rfq_telemetry::metrics::HEALTH_CACHE_TOTAL;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How long a health-check result stays fresh.
pub const HEALTH_CHECK_RESULT_CACHE_DURATION: Duration = Duration::from_millis(30_000);

/// TTL cache of health-check results keyed by chain.
pub struct HealthCheckCache {
    entries: DashMap<ChainId, (HealthCheckResult, Instant)>,
    ttl: Duration,
}

impl Default for HealthCheckCache {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthCheckCache {
    pub fn new() -> Self {
        Self::with_ttl(HEALTH_CHECK_RESULT_CACHE_DURATION)
    }

    /// Cache with a custom TTL. A zero TTL disables caching.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Return the cached result for `chain_id` if still fresh,
    /// otherwise run the check through `service` and cache the result.
    pub async fn get_or_refresh(
        &self,
        chain_id: ChainId,
        service: &Arc<dyn SwapService>,
    ) -> Result<HealthCheckResult, ServiceError> {
        if let Some(entry) = self.entries.get(&chain_id) {
            let (result, fetched_at) = entry.value();
            if fetched_at.elapsed() < self.ttl {
                HEALTH_CACHE_TOTAL.with_label_values(&["hit"]).inc();
                return Ok(result.clone());
            }
        }

        HEALTH_CACHE_TOTAL.with_label_values(&["refresh"]).inc();
        let result = service.run_health_check().await?;
        self.entries
            .insert(chain_id, (result.clone(), Instant::now()));
        Ok(result)
    }
}

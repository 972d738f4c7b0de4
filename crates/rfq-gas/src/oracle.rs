//! Fee oracle client.
//!
//! Supplies the current base fee and priority-fee estimates per network.

use crate::error::{GasError, GasResult};
use async_trait::async_trait;
use rfq_core::Wei;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Default timeout for oracle requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// How quickly the caller wants inclusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Urgency {
    Low,
    Standard,
    Fast,
    Instant,
}

impl Urgency {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Standard => "standard",
            Self::Fast => "fast",
            Self::Instant => "instant",
        }
    }
}

/// Read-only view of the network fee market.
#[async_trait]
pub trait GasOracle: Send + Sync {
    /// Current base fee per gas, in wei.
    async fn base_fee_per_gas(&self) -> GasResult<Wei>;

    /// Priority fee estimate for the given urgency, in wei.
    async fn max_priority_fee_per_gas(&self, urgency: Urgency) -> GasResult<Wei>;
}

/// Fee snapshot payload served by the oracle endpoint. Wei amounts are
/// decimal strings.
#[derive(Debug, Deserialize)]
struct OracleResponse {
    #[serde(rename = "baseFeePerGas")]
    base_fee_per_gas: String,
    #[serde(rename = "maxPriorityFeePerGas")]
    max_priority_fee_per_gas: HashMap<String, String>,
}

/// HTTP implementation of [`GasOracle`].
pub struct HttpGasOracle {
    client: reqwest::Client,
    url: String,
}

impl HttpGasOracle {
    pub fn new(url: impl Into<String>) -> GasResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| GasError::Oracle(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    async fn fetch(&self) -> GasResult<OracleResponse> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?;
        let snapshot: OracleResponse = response.json().await?;
        debug!(base_fee = %snapshot.base_fee_per_gas, "Fetched fee oracle snapshot");
        Ok(snapshot)
    }
}

#[async_trait]
impl GasOracle for HttpGasOracle {
    async fn base_fee_per_gas(&self) -> GasResult<Wei> {
        let snapshot = self.fetch().await?;
        snapshot
            .base_fee_per_gas
            .parse()
            .map_err(|_| GasError::MalformedResponse(snapshot.base_fee_per_gas))
    }

    async fn max_priority_fee_per_gas(&self, urgency: Urgency) -> GasResult<Wei> {
        let snapshot = self.fetch().await?;
        let raw = snapshot
            .max_priority_fee_per_gas
            .get(urgency.as_str())
            .ok_or_else(|| {
                GasError::MalformedResponse(format!("no estimate for urgency {}", urgency.as_str()))
            })?;
        raw.parse()
            .map_err(|_| GasError::MalformedResponse(raw.clone()))
    }
}

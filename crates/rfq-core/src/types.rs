//! Chain, token and integrator domain types.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// EVM chain identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ChainId(pub u64);

impl ChainId {
    #[inline]
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ChainId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| CoreError::InvalidChainId(s.to_string()))
    }
}

/// A checksummed-insensitive EVM token address, stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenAddress(String);

impl TokenAddress {
    /// Parse and normalize an address string.
    ///
    /// Accepts `0x` followed by exactly 40 hex characters; anything else
    /// is a validation failure at the admission boundary, never a panic.
    pub fn parse(raw: &str) -> Result<Self> {
        let lower = raw.to_ascii_lowercase();
        let hex = lower
            .strip_prefix("0x")
            .ok_or_else(|| CoreError::InvalidAddress(raw.to_string()))?;
        if hex.len() != 40 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(CoreError::InvalidAddress(raw.to_string()));
        }
        Ok(Self(lower))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether an address-shaped string is a plausible EVM address.
pub fn is_address(raw: &str) -> bool {
    TokenAddress::parse(raw).is_ok()
}

/// Trading side of a quote request.
///
/// `Sell` fills a fixed taker (input) amount; `Buy` fills a fixed
/// maker (output) amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketOperation {
    Buy,
    Sell,
}

impl fmt::Display for MarketOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => f.write_str("Buy"),
            Self::Sell => f.write_str("Sell"),
        }
    }
}

/// An API consumer account with its entitlements.
///
/// Immutable snapshot resolved once per request; admission fails when
/// the request's chain is outside `allowed_chain_ids`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Integrator {
    #[serde(rename = "integratorId")]
    pub integrator_id: String,
    pub label: String,
    #[serde(rename = "apiKeys")]
    pub api_keys: HashSet<String>,
    #[serde(rename = "allowedChainIds")]
    pub allowed_chain_ids: Vec<ChainId>,
    /// Entitled to gasless/meta-transaction flows.
    #[serde(default)]
    pub rfqm: bool,
    /// Entitled to private liquidity pool flows.
    #[serde(default)]
    pub plp: bool,
}

impl Integrator {
    #[inline]
    pub fn allows_chain(&self, chain_id: ChainId) -> bool {
        self.allowed_chain_ids.contains(&chain_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_id_from_str() {
        assert_eq!("1337".parse::<ChainId>().unwrap(), ChainId::new(1337));
        assert!("liger".parse::<ChainId>().is_err());
        assert!("".parse::<ChainId>().is_err());
        assert!("-5".parse::<ChainId>().is_err());
    }

    #[test]
    fn test_token_address_parse() {
        let addr = TokenAddress::parse("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48").unwrap();
        assert_eq!(addr.as_str(), "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");

        assert!(TokenAddress::parse("0xmakertoken").is_err());
        assert!(TokenAddress::parse("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48").is_err());
        assert!(TokenAddress::parse("0x1234").is_err());
    }

    #[test]
    fn test_integrator_allows_chain() {
        let integrator = Integrator {
            integrator_id: "uuid-integrator-id".to_string(),
            label: "Polygon Swap Machine".to_string(),
            api_keys: HashSet::new(),
            allowed_chain_ids: vec![ChainId::new(1337)],
            rfqm: false,
            plp: false,
        };
        assert!(integrator.allows_chain(ChainId::new(1337)));
        assert!(!integrator.allows_chain(ChainId::new(1)));
    }

    #[test]
    fn test_market_operation_serde() {
        assert_eq!(
            serde_json::from_str::<MarketOperation>("\"Buy\"").unwrap(),
            MarketOperation::Buy
        );
        assert!(serde_json::from_str::<MarketOperation>("\"Trade\"").is_err());
    }
}

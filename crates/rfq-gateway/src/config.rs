//! Gateway configuration.

use crate::error::{AppError, AppResult};
use rfq_api::{IntegratorDirectory, TokenMetadata, TokenRegistry};
use rfq_core::{ChainId, Integrator, TokenAddress};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Top-level configuration, loaded from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub server: ServerConfig,
    /// One entry per served chain.
    pub chains: Vec<ChainConfig>,
    #[serde(default)]
    pub integrators: Vec<IntegratorConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen port. Default: 3000.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

/// Per-chain wiring: upstream quote service, gas oracle, token list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    pub chain_id: u64,
    /// Base URL of the upstream quote service for this chain.
    pub quote_url: String,
    /// Base URL of the gas oracle for this chain.
    pub gas_oracle_url: String,
    /// Native asset symbol (e.g. "ETH").
    pub native_symbol: String,
    /// Wrapped-native symbol suggested in native-sell rejections.
    pub wrapped_native_symbol: String,
    #[serde(default)]
    pub tokens: Vec<TokenConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    pub symbol: String,
    pub address: String,
    pub decimals: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegratorConfig {
    pub integrator_id: String,
    pub label: String,
    pub api_keys: Vec<String>,
    pub allowed_chain_ids: Vec<u64>,
    #[serde(default)]
    pub rfqm: bool,
    #[serde(default)]
    pub plp: bool,
}

impl GatewayConfig {
    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }

    /// Build the token registry from the per-chain token lists.
    pub fn build_token_registry(&self) -> AppResult<TokenRegistry> {
        let mut registry = TokenRegistry::new();
        for chain in &self.chains {
            let chain_id = ChainId::new(chain.chain_id);
            registry.register_chain(chain_id, &chain.native_symbol, &chain.wrapped_native_symbol);
            for token in &chain.tokens {
                if token.decimals > rfq_core::MAX_TOKEN_DECIMALS {
                    return Err(AppError::Config(format!(
                        "Token {} on chain {} has {} decimals; the maximum supported is {}",
                        token.symbol,
                        chain.chain_id,
                        token.decimals,
                        rfq_core::MAX_TOKEN_DECIMALS
                    )));
                }
                let address = TokenAddress::parse(&token.address).map_err(|e| {
                    AppError::Config(format!(
                        "Invalid address for token {} on chain {}: {e}",
                        token.symbol, chain.chain_id
                    ))
                })?;
                registry.insert(
                    chain_id,
                    TokenMetadata {
                        symbol: token.symbol.clone(),
                        address,
                        decimals: token.decimals,
                    },
                );
            }
        }
        Ok(registry)
    }

    /// Build the integrator directory from the configured integrators.
    pub fn build_integrator_directory(&self) -> IntegratorDirectory {
        IntegratorDirectory::from_integrators(self.integrators.iter().map(|cfg| Integrator {
            integrator_id: cfg.integrator_id.clone(),
            label: cfg.label.clone(),
            api_keys: cfg.api_keys.iter().cloned().collect::<HashSet<_>>(),
            allowed_chain_ids: cfg.allowed_chain_ids.iter().copied().map(ChainId::new).collect(),
            rfqm: cfg.rfqm,
            plp: cfg.plp,
        }))
    }
}

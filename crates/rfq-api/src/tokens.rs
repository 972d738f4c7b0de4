//! Per-chain token metadata registry.
//!
//! Resolves token symbols to canonical addresses, answers the
//! native-asset predicate, and names the wrapped native symbol used in
//! rejection messages.

use rfq_core::{ChainId, TokenAddress};
use std::collections::HashMap;

/// Sentinel address for the unwrapped native asset.
pub const NATIVE_TOKEN_ADDRESS: &str = "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee";

#[derive(Debug, Clone)]
pub struct TokenMetadata {
    pub symbol: String,
    pub address: TokenAddress,
    pub decimals: u8,
}

#[derive(Debug, Clone)]
struct ChainTokens {
    by_symbol: HashMap<String, TokenMetadata>,
    native_symbol: String,
    wrapped_native_symbol: String,
}

/// Token metadata keyed by chain, populated at startup.
#[derive(Debug, Clone, Default)]
pub struct TokenRegistry {
    chains: HashMap<ChainId, ChainTokens>,
}

impl TokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with Ethereum mainnet metadata.
    pub fn with_mainnet_defaults() -> Self {
        let mut registry = Self::new();
        let mainnet = ChainId::new(1);
        registry.register_chain(mainnet, "ETH", "WETH");
        for (symbol, address, decimals) in [
            ("WETH", "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2", 18u8),
            ("USDC", "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48", 6),
            ("USDT", "0xdac17f958d2ee523a2206206994597c13d831ec7", 6),
            ("DAI", "0x6b175474e89094c44da98b954eedeac495271d0f", 18),
            ("WBTC", "0x2260fac5e5542a773aa44fbcfedf7c193bc2c599", 8),
            ("AAVE", "0x7fc66500c84a76ad7e9c93437bfc5ac33e2ddae9", 18),
        ] {
            registry.insert(
                mainnet,
                TokenMetadata {
                    symbol: symbol.to_string(),
                    address: TokenAddress::parse(address).expect("static address"),
                    decimals,
                },
            );
        }
        registry
    }

    /// Declare a chain with its native and wrapped-native symbols.
    pub fn register_chain(
        &mut self,
        chain_id: ChainId,
        native_symbol: &str,
        wrapped_native_symbol: &str,
    ) {
        self.chains.entry(chain_id).or_insert_with(|| ChainTokens {
            by_symbol: HashMap::new(),
            native_symbol: native_symbol.to_ascii_uppercase(),
            wrapped_native_symbol: wrapped_native_symbol.to_ascii_uppercase(),
        });
    }

    pub fn insert(&mut self, chain_id: ChainId, metadata: TokenMetadata) {
        if let Some(chain) = self.chains.get_mut(&chain_id) {
            chain
                .by_symbol
                .insert(metadata.symbol.to_ascii_uppercase(), metadata);
        }
    }

    /// Resolve a symbol to its canonical address on a chain.
    pub fn address_for_symbol(&self, symbol: &str, chain_id: ChainId) -> Option<TokenAddress> {
        self.metadata_for_symbol(symbol, chain_id)
            .map(|m| m.address.clone())
    }

    pub fn metadata_for_symbol(&self, symbol: &str, chain_id: ChainId) -> Option<&TokenMetadata> {
        self.chains
            .get(&chain_id)?
            .by_symbol
            .get(&symbol.to_ascii_uppercase())
    }

    /// Resolve an address back to its metadata on a chain.
    pub fn metadata_for_address(
        &self,
        address: &TokenAddress,
        chain_id: ChainId,
    ) -> Option<&TokenMetadata> {
        self.chains
            .get(&chain_id)?
            .by_symbol
            .values()
            .find(|m| m.address == *address)
    }

    /// Whether a raw token string names the unwrapped native asset,
    /// either by symbol or by the sentinel address.
    pub fn is_native_symbol_or_address(&self, raw: &str, chain_id: ChainId) -> bool {
        if raw.eq_ignore_ascii_case(NATIVE_TOKEN_ADDRESS) {
            return true;
        }
        self.chains
            .get(&chain_id)
            .is_some_and(|chain| chain.native_symbol.eq_ignore_ascii_case(raw))
    }

    /// The wrapped-native symbol suggested in native-sell rejections.
    pub fn wrapped_native_symbol(&self, chain_id: ChainId) -> Option<&str> {
        self.chains
            .get(&chain_id)
            .map(|chain| chain.wrapped_native_symbol.as_str())
    }
}

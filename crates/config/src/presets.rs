//! Built-in chain configurations.

use crate::chain::{AppChainConfig, BlockExplorer, ChainDefinition, CurrencyMetadata, NativeCurrency};
use alloy_chains::NamedChain;
use alloy_primitives::{Address, address};
use url::Url;

/// The chain used when a wallet reports an unknown or malformed chain id.
pub const DEFAULT_APP_CHAIN_ID: u64 = NamedChain::Arbitrum as u64;

const BACKEND_URL: &str = "https://api.fareplay.io";
const WS_URL: &str = "wss://ws.fareplay.io";

const USDC_ARBITRUM: Address = address!("0xaf88d065e77c8cC2239327C5EDb3A432268e5831");
const USDC_ARBITRUM_SEPOLIA: Address = address!("0x75faf114eafb1BDbe2F0316DF893fd58CE46AA4d");
const USDC_BASE: Address = address!("0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913");

/// Returns every preset chain configuration.
pub fn all() -> Vec<AppChainConfig> {
    vec![arbitrum(), arbitrum_sepolia(), base()]
}

/// Arbitrum One.
pub fn arbitrum() -> AppChainConfig {
    preset(
        NamedChain::Arbitrum,
        "Arbitrum One",
        "https://arb1.arbitrum.io/rpc",
        ("Arbiscan", "https://arbiscan.io"),
        USDC_ARBITRUM,
    )
}

/// Arbitrum Sepolia testnet.
pub fn arbitrum_sepolia() -> AppChainConfig {
    preset(
        NamedChain::ArbitrumSepolia,
        "Arbitrum Sepolia",
        "https://sepolia-rollup.arbitrum.io/rpc",
        ("Arbiscan", "https://sepolia.arbiscan.io"),
        USDC_ARBITRUM_SEPOLIA,
    )
}

/// Base mainnet.
pub fn base() -> AppChainConfig {
    preset(
        NamedChain::Base,
        "Base",
        "https://mainnet.base.org",
        ("Basescan", "https://basescan.org"),
        USDC_BASE,
    )
}

fn preset(
    chain: NamedChain,
    name: &str,
    rpc_url: &str,
    (explorer_name, explorer_url): (&str, &str),
    usdc: Address,
) -> AppChainConfig {
    let id = chain as u64;
    AppChainConfig {
        chain_id: id,
        chain: ChainDefinition {
            id,
            name: name.to_string(),
            rpc_url: static_url(rpc_url),
            native_currency: NativeCurrency::ether(),
            block_explorer: Some(BlockExplorer {
                name: explorer_name.to_string(),
                url: static_url(explorer_url),
            }),
        },
        bundler_url: static_url(&format!("https://bundler.biconomy.io/api/v3/{id}/bundler")),
        paymaster_url: static_url(&format!("https://paymaster.biconomy.io/api/v2/{id}/paymaster")),
        http_url: static_url(BACKEND_URL),
        ws_url: Some(static_url(WS_URL)),
        currency: CurrencyMetadata {
            name: "USD Coin".to_string(),
            symbol: "USDC".to_string(),
            decimals: 6,
            address: Some(usdc),
        },
    }
}

#[track_caller]
fn static_url(url: &str) -> Url {
    Url::parse(url).expect("preset URLs are valid")
}

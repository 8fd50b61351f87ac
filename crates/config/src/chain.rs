//! Chain definitions and per-chain application configuration.

use alloy_chains::NamedChain;
use alloy_primitives::{Address, ChainId};
use serde::{Deserialize, Serialize};
use url::Url;

/// Parses a CAIP-2 style chain identifier (`"<namespace>:<decimal>"`, e.g. `"eip155:42161"`)
/// into its numeric chain id.
///
/// Malformed input is tolerated and yields `0`, which the chain registry treats as unknown.
///
/// # Examples
///
/// ```
/// use fare_config::parse_chain_id;
///
/// assert_eq!(parse_chain_id("eip155:42161"), 42161);
/// assert_eq!(parse_chain_id("malformed"), 0);
/// ```
pub fn parse_chain_id(caip: &str) -> ChainId {
    caip.split(':').nth(1).and_then(|id| id.trim().parse().ok()).unwrap_or_default()
}

/// Formats a numeric chain id as an `eip155` CAIP-2 identifier.
pub fn format_chain_id(chain_id: ChainId) -> String {
    format!("eip155:{chain_id}")
}

/// Native currency of a chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl NativeCurrency {
    /// Ether, used by every rollup shipped in the presets.
    pub fn ether() -> Self {
        Self { name: "Ether".to_string(), symbol: "ETH".to_string(), decimals: 18 }
    }
}

/// A block explorer entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockExplorer {
    pub name: String,
    pub url: Url,
}

/// The chain a smart account and its signer are bound to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainDefinition {
    pub id: ChainId,
    pub name: String,
    /// Public JSON-RPC endpoint, used for reads and fee estimation.
    pub rpc_url: Url,
    pub native_currency: NativeCurrency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_explorer: Option<BlockExplorer>,
}

impl ChainDefinition {
    /// Returns the [NamedChain] for this id, if alloy knows about it.
    pub fn named(&self) -> Option<NamedChain> {
        NamedChain::try_from(self.id).ok()
    }
}

/// The ERC-20 the application settles in on a given chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}

/// Application configuration for one supported chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppChainConfig {
    pub chain_id: ChainId,
    pub chain: ChainDefinition,
    /// ERC-4337 bundler endpoint.
    pub bundler_url: Url,
    /// Gas sponsorship endpoint.
    pub paymaster_url: Url,
    /// Backend base URL for session verification.
    pub http_url: Url,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ws_url: Option<Url>,
    pub currency: CurrencyMetadata,
}

impl AppChainConfig {
    /// Returns the default block explorer URL, or an empty string if the chain has none.
    pub fn block_explorer_url(&self) -> String {
        self.chain.block_explorer.as_ref().map(|explorer| explorer.url.to_string()).unwrap_or_default()
    }
}

//! Wallet records reported by the wallet provider.

use crate::error::{ProviderError, WalletParseError};
use alloy_primitives::{Address, ChainId};
use alloy_rpc_types_eth::TransactionRequest;
use async_trait::async_trait;
use fare_config::parse_chain_id;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr, sync::Arc};

/// Connector type the provider SDK uses for its own custodial wallets.
pub const EMBEDDED_CONNECTOR: &str = "embedded";

/// Wallet client type the provider SDK uses for its own custodial wallets.
pub const EMBEDDED_CLIENT: &str = "privy";

/// Authentication readiness reported by the wallet provider.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub ready: bool,
    pub authenticated: bool,
}

impl AuthSession {
    pub const fn new(ready: bool, authenticated: bool) -> Self {
        Self { ready, authenticated }
    }

    /// Both flags set; nothing wallet related is determinable before that.
    pub const fn is_ready_and_authenticated(&self) -> bool {
        self.ready && self.authenticated
    }
}

/// The authenticated user as known to the auth provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smart_wallet: Option<Address>,
}

/// Parameters of `wallet_switchEthereumChain`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchChainParams {
    pub chain_id: String,
}

/// EIP-1193 requests issued against a wallet's provider.
/// Reference: <https://eips.ethereum.org/EIPS/eip-1193>
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum EthereumRequest {
    #[serde(rename = "eth_requestAccounts")]
    RequestAccounts,

    #[serde(rename = "eth_chainId")]
    ChainId,

    #[serde(rename = "eth_sendTransaction")]
    SendTransaction([TransactionRequest; 1]),

    #[serde(rename = "personal_sign")]
    PersonalSign(String, Address),

    #[serde(rename = "wallet_switchEthereumChain")]
    SwitchChain([SwitchChainParams; 1]),
}

impl EthereumRequest {
    pub fn method(&self) -> &'static str {
        match self {
            Self::RequestAccounts => "eth_requestAccounts",
            Self::ChainId => "eth_chainId",
            Self::SendTransaction(_) => "eth_sendTransaction",
            Self::PersonalSign(..) => "personal_sign",
            Self::SwitchChain(_) => "wallet_switchEthereumChain",
        }
    }

    /// `wallet_switchEthereumChain` for a numeric chain id.
    pub fn switch_chain(chain_id: ChainId) -> Self {
        Self::SwitchChain([SwitchChainParams { chain_id: format!("{chain_id:#x}") }])
    }
}

/// An EIP-1193 provider exposed by a connected wallet.
#[async_trait]
pub trait Eip1193Provider: Send + Sync + fmt::Debug {
    /// Sends `request` to the wallet and returns the raw JSON result.
    async fn request(&self, request: EthereumRequest) -> Result<serde_json::Value, ProviderError>;
}

pub type SharedProvider = Arc<dyn Eip1193Provider>;

/// Per-wallet handle owned by the wallet provider.
#[async_trait]
pub trait WalletConnector: Send + Sync + fmt::Debug {
    /// Returns the wallet's EIP-1193 provider. May fail or never resolve.
    async fn ethereum_provider(&self) -> Result<SharedProvider, ProviderError>;
}

pub type WalletHandle = Arc<dyn WalletConnector>;

/// Kind of a linked wallet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletKind {
    Embedded,
    External,
}

/// A custodial wallet created and held by the auth provider.
#[derive(Clone, Debug)]
pub struct EmbeddedWallet {
    pub address: Address,
    /// CAIP-2 chain identifier, e.g. `eip155:42161`.
    pub chain_id: String,
    pub linked: bool,
    pub handle: WalletHandle,
}

/// A user-supplied wallet connected through an extension or wallet-connect.
#[derive(Clone, Debug)]
pub struct ExternalWallet {
    pub address: Address,
    /// CAIP-2 chain identifier, e.g. `eip155:42161`.
    pub chain_id: String,
    pub linked: bool,
    /// Connector name, e.g. `metamask` or `wallet_connect`.
    pub connector: String,
    pub handle: WalletHandle,
}

/// A wallet reported by the wallet provider.
#[derive(Clone, Debug)]
pub enum LinkedWallet {
    Embedded(EmbeddedWallet),
    External(ExternalWallet),
}

/// The comparable part of a [LinkedWallet], without its provider handle.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct WalletIdentity {
    pub kind: WalletKind,
    pub address: Address,
    pub chain_id: String,
}

impl LinkedWallet {
    pub fn kind(&self) -> WalletKind {
        match self {
            Self::Embedded(_) => WalletKind::Embedded,
            Self::External(_) => WalletKind::External,
        }
    }

    pub fn address(&self) -> Address {
        match self {
            Self::Embedded(w) => w.address,
            Self::External(w) => w.address,
        }
    }

    /// The raw CAIP-2 chain identifier.
    pub fn chain_id(&self) -> &str {
        match self {
            Self::Embedded(w) => &w.chain_id,
            Self::External(w) => &w.chain_id,
        }
    }

    /// The numeric chain id, `0` if the identifier is malformed.
    pub fn chain_id_numeric(&self) -> ChainId {
        parse_chain_id(self.chain_id())
    }

    pub fn is_linked(&self) -> bool {
        match self {
            Self::Embedded(w) => w.linked,
            Self::External(w) => w.linked,
        }
    }

    pub fn is_embedded(&self) -> bool {
        matches!(self, Self::Embedded(_))
    }

    pub fn handle(&self) -> &WalletHandle {
        match self {
            Self::Embedded(w) => &w.handle,
            Self::External(w) => &w.handle,
        }
    }

    pub fn identity(&self) -> WalletIdentity {
        WalletIdentity {
            kind: self.kind(),
            address: self.address(),
            chain_id: self.chain_id().to_string(),
        }
    }
}

/// A wallet record as the provider SDK reports it: loosely typed, every field optional.
///
/// Converted into a [LinkedWallet] with [`TryFrom`], which is the only way records enter the
/// rest of the crate.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawWallet {
    pub address: String,
    #[serde(default)]
    pub connector_type: Option<String>,
    #[serde(default)]
    pub wallet_client_type: Option<String>,
    #[serde(default)]
    pub chain_id: Option<String>,
    #[serde(default)]
    pub linked: bool,
    #[serde(skip)]
    pub handle: Option<WalletHandle>,
}

impl TryFrom<RawWallet> for LinkedWallet {
    type Error = WalletParseError;

    fn try_from(raw: RawWallet) -> Result<Self, Self::Error> {
        let address = Address::from_str(raw.address.trim()).map_err(|source| {
            WalletParseError::InvalidAddress { address: raw.address.clone(), source }
        })?;
        let handle = raw.handle.ok_or_else(|| WalletParseError::MissingHandle(raw.address.clone()))?;
        let chain_id = raw.chain_id.unwrap_or_default();

        let embedded = raw.connector_type.as_deref() == Some(EMBEDDED_CONNECTOR)
            || raw.wallet_client_type.as_deref() == Some(EMBEDDED_CLIENT);
        if embedded {
            return Ok(Self::Embedded(EmbeddedWallet { address, chain_id, linked: raw.linked, handle }));
        }

        let connector = raw
            .connector_type
            .or(raw.wallet_client_type)
            .filter(|c| !c.is_empty())
            .ok_or(WalletParseError::MissingConnector(raw.address))?;
        Ok(Self::External(ExternalWallet { address, chain_id, linked: raw.linked, connector, handle }))
    }
}

/// Converts raw provider records, dropping (and logging) the ones that fail validation.
pub fn parse_wallets(raw: impl IntoIterator<Item = RawWallet>) -> Vec<LinkedWallet> {
    raw.into_iter()
        .filter_map(|raw| match LinkedWallet::try_from(raw) {
            Ok(wallet) => Some(wallet),
            Err(err) => {
                warn!(target: "wallets", %err, "dropping invalid wallet record");
                None
            }
        })
        .collect()
}

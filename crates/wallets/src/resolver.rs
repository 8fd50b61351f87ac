//! Active wallet resolution.

use crate::{
    account::SmartAccountClient,
    projection::WalletSetProjection,
    wallet::{AuthSession, LinkedWallet, WalletKind},
};
use alloy_primitives::{Address, ChainId};
use fare_config::parse_chain_id;
use serde::Serialize;

/// What kind of wallet the active identity is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveWalletKind {
    Embedded,
    External,
    /// The smart account controlled by the embedded wallet.
    Smart,
}

impl From<WalletKind> for ActiveWalletKind {
    fn from(kind: WalletKind) -> Self {
        match kind {
            WalletKind::Embedded => Self::Embedded,
            WalletKind::External => Self::External,
        }
    }
}

/// The single wallet identity used for signing and transactions.
///
/// When `kind` is [`ActiveWalletKind::Smart`], `address` equals `smart_address` and
/// `underlying_embedded_address` holds the embedded signer's own address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveWallet {
    pub address: Address,
    pub chain_id_numeric: ChainId,
    pub kind: ActiveWalletKind,
    pub underlying_embedded_address: Option<Address>,
    pub smart_address: Option<Address>,
    /// Whether the wallet backing this identity is linked to the user.
    pub linked: bool,
}

impl ActiveWallet {
    fn from_wallet(wallet: &LinkedWallet) -> Self {
        Self {
            address: wallet.address(),
            chain_id_numeric: wallet.chain_id_numeric(),
            kind: wallet.kind().into(),
            underlying_embedded_address: None,
            smart_address: None,
            linked: wallet.is_linked(),
        }
    }

    pub fn is_smart(&self) -> bool {
        self.kind == ActiveWalletKind::Smart
    }
}

/// Resolves the active wallet.
///
/// `None` means resolution is pending: the provider is not ready, the user is not authenticated,
/// no linked wallet exists, or the smart account is preferred but not provisioned yet. There is
/// no fallback from a missing smart account to the embedded wallet.
pub fn resolve(
    projection: &WalletSetProjection,
    auth: AuthSession,
    smart_client: Option<&dyn SmartAccountClient>,
    prefer_smart_wallet: bool,
) -> Option<ActiveWallet> {
    if !auth.is_ready_and_authenticated() {
        return None;
    }

    if prefer_smart_wallet {
        let client = smart_client?;
        let embedded = projection.embedded.as_ref()?;
        let smart_address = client.account_address();
        return Some(ActiveWallet {
            address: smart_address,
            chain_id_numeric: parse_chain_id(&embedded.chain_id),
            kind: ActiveWalletKind::Smart,
            underlying_embedded_address: Some(embedded.address),
            smart_address: Some(smart_address),
            linked: embedded.linked,
        });
    }

    if let Some(external) = &projection.external {
        return Some(ActiveWallet {
            address: external.address,
            chain_id_numeric: parse_chain_id(&external.chain_id),
            kind: ActiveWalletKind::External,
            underlying_embedded_address: None,
            smart_address: None,
            linked: external.linked,
        });
    }
    if let Some(embedded) = &projection.embedded {
        return Some(ActiveWallet {
            address: embedded.address,
            chain_id_numeric: parse_chain_id(&embedded.chain_id),
            kind: ActiveWalletKind::Embedded,
            underlying_embedded_address: None,
            smart_address: None,
            linked: embedded.linked,
        });
    }
    projection.linked.first().map(ActiveWallet::from_wallet)
}

//! The wallet/auth provider boundary.

use crate::{
    error::ProviderError,
    wallet::{AuthSession, LinkedWallet, UserRecord},
};
use alloy_primitives::Address;
use async_trait::async_trait;
use std::fmt;

/// How an account was linked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinkMethod {
    /// Sign-in with Ethereum.
    Siwe,
    Other(String),
}

impl fmt::Display for LinkMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Siwe => f.write_str("siwe"),
            Self::Other(method) => f.write_str(method),
        }
    }
}

impl From<&str> for LinkMethod {
    fn from(method: &str) -> Self {
        match method {
            "siwe" => Self::Siwe,
            other => Self::Other(other.to_string()),
        }
    }
}

/// A completed login.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoginOutcome {
    pub user: UserRecord,
    /// e.g. `email`, `google`, `siwe`.
    pub login_method: String,
    pub is_new_user: bool,
}

/// A completed account link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkOutcome {
    pub user: UserRecord,
    pub link_method: LinkMethod,
    pub linked_address: Option<Address>,
}

/// A failed account link.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("failed to link account via {method}: {error}")]
pub struct LinkError {
    pub method: LinkMethod,
    #[source]
    pub error: ProviderError,
}

/// The wallet/auth provider.
///
/// Every interactive operation resolves once the user finished or left the flow.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    fn session(&self) -> AuthSession;

    /// All wallets the provider knows about, linked or not, in provider order.
    fn wallets(&self) -> Vec<LinkedWallet>;

    fn user(&self) -> Option<UserRecord>;

    async fn login(&self) -> Result<LoginOutcome, ProviderError>;

    async fn logout(&self) -> Result<(), ProviderError>;

    /// Links a wallet to the authenticated user.
    async fn link_wallet(&self) -> Result<LinkOutcome, LinkError>;

    /// Connects an external wallet without linking it.
    async fn connect_wallet(&self) -> Result<LinkedWallet, ProviderError>;
}

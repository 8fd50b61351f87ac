use alloy_primitives::hex::FromHexError;
use std::time::Duration;

/// Errors reported by the wallet/auth provider.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("wallet is already linked to another user")]
    LinkedToAnotherUser,
    #[error("user exited the {0} flow")]
    Exited(&'static str),
    #[error("provider is not ready")]
    NotReady,
    #[error("provider request `{method}` failed: {message}")]
    Request { method: String, message: String },
    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Whether retrying the same request may succeed. User decisions are final.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::LinkedToAnotherUser | Self::Exited(_))
    }
}

/// Errors raised while validating wallet records at the provider boundary.
#[derive(Debug, thiserror::Error)]
pub enum WalletParseError {
    #[error("wallet address `{address}` is invalid: {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: FromHexError,
    },
    #[error("wallet {0} has no connector type")]
    MissingConnector(String),
    #[error("wallet {0} has no provider handle")]
    MissingHandle(String),
}

/// Errors raised while building a smart account client.
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error("failed to acquire the signer's ethereum provider: {0}")]
    Provider(#[from] ProviderError),
    #[error("timed out after {0:?} waiting for {1}")]
    Timeout(Duration, &'static str),
    #[error("failed to create signer: {0}")]
    Signer(String),
    #[error("failed to derive smart account: {0}")]
    Account(String),
    #[error("bundler error: {0}")]
    Bundler(String),
    #[error("paymaster error: {0}")]
    Paymaster(String),
    #[error("fee estimation failed: {0}")]
    FeeEstimation(String),
}

/// Errors returned by the backend verification service.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("invalid backend url: {0}")]
    Url(#[from] url::ParseError),
    #[error("backend rejected `{path}` with status {status}")]
    Status { path: &'static str, status: reqwest::StatusCode },
}

/// Errors raised while checking smart wallet contract approvals.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ApprovalError {
    #[error("approval lookup failed: {0}")]
    Lookup(String),
    #[error("approval check timed out after {0:?}")]
    Timeout(Duration),
}

//! The account-abstraction client boundary.
//!
//! Signing, account derivation and user operation submission live in an external
//! account-abstraction client. This crate only drives it through [AccountAbstraction] and holds
//! the resulting [SmartAccountClient].

use crate::{
    error::ProvisionError,
    fees::SharedFeeEstimator,
    signer::Eip1193Signer,
    wallet::SharedProvider,
};
use alloy_primitives::{Address, ChainId, TxHash};
use alloy_rpc_types_eth::TransactionRequest;
use async_trait::async_trait;
use fare_config::{AppChainConfig, ChainDefinition, PaymasterContext};
use std::{fmt, sync::Arc};
use url::Url;

/// A bundler-backed smart account client.
#[async_trait]
pub trait SmartAccountClient: Send + Sync + fmt::Debug {
    /// The counterfactual address of the smart account.
    fn account_address(&self) -> Address;

    fn chain_id(&self) -> ChainId;

    /// Wraps `tx` into a user operation and submits it through the bundler.
    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash, ProvisionError>;
}

pub type SharedSmartAccountClient = Arc<dyn SmartAccountClient>;

/// Paymaster endpoint and the context sent with every sponsorship request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaymasterConfig {
    pub url: Url,
    pub context: PaymasterContext,
}

/// Builds smart accounts and their clients.
#[async_trait]
pub trait AccountAbstraction: Send + Sync + 'static {
    /// Deterministic smart account descriptor.
    type Account: Send;

    /// Wraps the signer wallet's provider as a chain-bound signer.
    async fn create_signer(
        &self,
        provider: SharedProvider,
        address: Address,
        chain: &ChainDefinition,
    ) -> Result<Eip1193Signer, ProvisionError> {
        Ok(Eip1193Signer::new(provider, address, chain.id))
    }

    /// Derives the nexus smart account controlled by `signer` on `chain`.
    async fn derive_smart_account(
        &self,
        signer: Eip1193Signer,
        chain: &AppChainConfig,
    ) -> Result<Self::Account, ProvisionError>;

    /// Builds the bundler client for `account`, sponsored through `paymaster`.
    async fn create_smart_account_client(
        &self,
        account: Self::Account,
        bundler_url: &Url,
        paymaster: &PaymasterConfig,
        fees: SharedFeeEstimator,
    ) -> Result<SharedSmartAccountClient, ProvisionError>;
}

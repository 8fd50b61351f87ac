//! Smart account provisioning.
//!
//! A provisioning run turns the signer wallet and the chain config into a bundler-backed
//! [SmartAccountClient](crate::account::SmartAccountClient) and publishes it into the
//! [WalletStateStore]. Runs are started by [`SmartAccountProvisioner::update`] whenever the
//! inputs change and are never aborted; instead every run carries a generation, and only the
//! latest generation may publish.

use crate::{
    account::{AccountAbstraction, PaymasterConfig, SharedSmartAccountClient},
    error::ProvisionError,
    fees::{PublicClientFeeEstimator, SafetyMarginFeeEstimator, SharedFeeEstimator},
    projection::WalletSetProjection,
    store::WalletStateStore,
    wallet::{LinkedWallet, SharedProvider, WalletIdentity},
};
use alloy_primitives::Address;
use fare_config::{AppChainConfig, AppChainRegistry, ChainDefinition, ProvisioningConfig};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::task::JoinHandle;
use url::Url;

/// What a provisioning run needs.
#[derive(Clone, Debug)]
pub struct ProvisionInputs {
    pub signer: LinkedWallet,
    pub chain: AppChainConfig,
}

impl ProvisionInputs {
    /// Selects the signer, the embedded wallet if present and otherwise the external one, and
    /// the config of the signer's chain.
    pub fn select(projection: &WalletSetProjection, registry: &AppChainRegistry) -> Option<Self> {
        let signer = projection
            .embedded
            .clone()
            .map(LinkedWallet::Embedded)
            .or_else(|| projection.external.clone().map(LinkedWallet::External))?;
        let chain = registry.lookup(signer.chain_id_numeric()).clone();
        Some(Self { signer, chain })
    }

    fn key(&self) -> ProvisionKey {
        ProvisionKey {
            signer: self.signer.identity(),
            chain: self.chain.chain.clone(),
            bundler_url: self.chain.bundler_url.clone(),
            paymaster_url: self.chain.paymaster_url.clone(),
        }
    }
}

/// The inputs whose change triggers a new run.
#[derive(Clone, Debug, PartialEq, Eq)]
struct ProvisionKey {
    signer: WalletIdentity,
    chain: ChainDefinition,
    bundler_url: Url,
    paymaster_url: Url,
}

/// The inputs of the latest run, and whether that run failed.
#[derive(Debug, Default)]
struct LastRun {
    key: Option<ProvisionKey>,
    failed: bool,
}

/// Result of a provisioning run.
#[derive(Debug)]
pub enum ProvisionOutcome {
    /// The client was published into the store.
    Published { generation: u64, address: Address },
    /// A newer run started before this one finished; its client was dropped.
    Superseded { generation: u64 },
    /// The run failed; the store keeps its previous client.
    Failed { generation: u64, error: ProvisionError },
}

impl ProvisionOutcome {
    pub fn generation(&self) -> u64 {
        match self {
            Self::Published { generation, .. }
            | Self::Superseded { generation }
            | Self::Failed { generation, .. } => *generation,
        }
    }

    pub fn is_published(&self) -> bool {
        matches!(self, Self::Published { .. })
    }
}

/// Provisions smart account clients into a [WalletStateStore].
#[derive(Debug)]
pub struct SmartAccountProvisioner<A> {
    aa: Arc<A>,
    store: WalletStateStore,
    config: ProvisioningConfig,
    last: Arc<Mutex<LastRun>>,
}

impl<A> Clone for SmartAccountProvisioner<A> {
    fn clone(&self) -> Self {
        Self {
            aa: self.aa.clone(),
            store: self.store.clone(),
            config: self.config.clone(),
            last: self.last.clone(),
        }
    }
}

impl<A: AccountAbstraction> SmartAccountProvisioner<A> {
    pub fn new(aa: A, store: WalletStateStore, config: ProvisioningConfig) -> Self {
        Self { aa: Arc::new(aa), store, config, last: Arc::default() }
    }

    pub fn store(&self) -> &WalletStateStore {
        &self.store
    }

    pub fn config(&self) -> &ProvisioningConfig {
        &self.config
    }

    /// Feeds new inputs.
    ///
    /// Starts a run on the current tokio runtime if they differ from the previous inputs, or if
    /// the latest run with these inputs failed, and returns its handle. `None` inputs supersede any run in flight and clear the client. A
    /// changed signer clears the client right away; other changes keep it until the new run
    /// publishes.
    pub fn update(&self, inputs: Option<ProvisionInputs>) -> Option<JoinHandle<ProvisionOutcome>> {
        let key = inputs.as_ref().map(ProvisionInputs::key);
        let generation = {
            let mut last = self.last.lock();
            if last.key == key && !last.failed {
                return None;
            }
            let signer_changed =
                last.key.as_ref().map(|k| &k.signer) != key.as_ref().map(|k| &k.signer);
            *last = LastRun { key, failed: false };
            self.store.begin_client_generation(signer_changed)
        };

        let Some(inputs) = inputs else {
            debug!(target: "wallets::provisioner", generation, "signer gone, cleared smart account client");
            return None;
        };
        let this = self.clone();
        Some(tokio::spawn(async move { this.run(generation, inputs).await }))
    }

    async fn run(self, generation: u64, inputs: ProvisionInputs) -> ProvisionOutcome {
        let ProvisionInputs { signer, chain } = inputs;
        debug!(
            target: "wallets::provisioner",
            generation,
            signer = %signer.address(),
            chain_id = chain.chain_id,
            "provisioning smart account"
        );

        let limit = self.config.client_timeout();
        let result = match tokio::time::timeout(limit, self.build(&signer, &chain)).await {
            Ok(result) => result,
            Err(_) => Err(ProvisionError::Timeout(limit, "smart account client")),
        };

        match result {
            Ok(client) => {
                let address = client.account_address();
                if self.store.publish_client(generation, client) {
                    debug!(target: "wallets::provisioner", generation, %address, "published smart account client");
                    ProvisionOutcome::Published { generation, address }
                } else {
                    debug!(target: "wallets::provisioner", generation, %address, "discarding superseded smart account client");
                    ProvisionOutcome::Superseded { generation }
                }
            }
            Err(error) => {
                warn!(target: "wallets::provisioner", generation, %error, "failed to provision smart account");
                // the same inputs may be fed again; `update` holds this lock while issuing
                // generations, so the check below cannot race a newer run
                let mut last = self.last.lock();
                if self.store.snapshot().client_generation() == generation {
                    last.failed = true;
                }
                ProvisionOutcome::Failed { generation, error }
            }
        }
    }

    async fn build(
        &self,
        signer: &LinkedWallet,
        chain: &AppChainConfig,
    ) -> Result<SharedSmartAccountClient, ProvisionError> {
        let provider = self.acquire_provider(signer).await?;
        let signer = self.aa.create_signer(provider, signer.address(), &chain.chain).await?;
        let account = self.aa.derive_smart_account(signer, chain).await?;

        let base: SharedFeeEstimator =
            Arc::new(PublicClientFeeEstimator::http(chain.chain.rpc_url.clone()));
        let fees = Arc::new(SafetyMarginFeeEstimator::new(base, self.config.fee_multiplier_bps));
        let paymaster = PaymasterConfig {
            url: chain.paymaster_url.clone(),
            context: self.config.paymaster.clone(),
        };
        self.aa.create_smart_account_client(account, &chain.bundler_url, &paymaster, fees).await
    }

    /// Acquires the wallet's EIP-1193 provider, retrying with exponential backoff.
    async fn acquire_provider(&self, wallet: &LinkedWallet) -> Result<SharedProvider, ProvisionError> {
        let limit = self.config.provider_timeout();
        let mut backoff = self.config.initial_backoff();
        let mut attempt = 0;
        loop {
            let (error, retryable) =
                match tokio::time::timeout(limit, wallet.handle().ethereum_provider()).await {
                    Ok(Ok(provider)) => return Ok(provider),
                    Ok(Err(err)) => {
                        let retryable = err.is_retryable();
                        (ProvisionError::Provider(err), retryable)
                    }
                    Err(_) => (ProvisionError::Timeout(limit, "ethereum provider"), true),
                };
            if !retryable || attempt >= self.config.max_retries {
                return Err(error);
            }
            attempt += 1;
            trace!(target: "wallets::provisioner", attempt, ?backoff, %error, "retrying provider acquisition");
            tokio::time::sleep(backoff).await;
            backoff = backoff.saturating_mul(2);
        }
    }
}

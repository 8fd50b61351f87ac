//! The wallet session: the provider, the chain registry and the shared store, put together.

use crate::{
    account::AccountAbstraction,
    projection::{WalletSetProjection, project},
    provider::WalletProvider,
    provisioner::{ProvisionInputs, ProvisionOutcome, SmartAccountProvisioner},
    resolver::{ActiveWallet, resolve},
    store::WalletStateStore,
    wallet::{EmbeddedWallet, ExternalWallet, LinkedWallet},
};
use alloy_primitives::{Address, ChainId};
use fare_config::{AppChainConfig, AppChainRegistry, ChainConfigError, Config};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Everything derived from the provider and the store at one point in time.
#[derive(Clone, Debug)]
pub struct WalletSnapshot {
    pub embedded: Option<EmbeddedWallet>,
    pub external: Option<ExternalWallet>,
    pub active: Option<ActiveWallet>,
    /// The active wallet's chain, `0` without an active wallet.
    pub wallet_chain_id: ChainId,
    pub is_wallet_authed: bool,
    /// The active wallet's checksummed address, empty without an active wallet.
    pub wallet_address: String,
    pub smart_wallet_address: Option<Address>,
    /// The active wallet's chain config, or the default chain's.
    pub app_chain_config: AppChainConfig,
    pub is_wrong_network: bool,
    pub prefer_smart_wallet: bool,
    pub ready: bool,
    pub authenticated: bool,
    pub ready_and_auth: bool,
    pub linked_wallets: Vec<LinkedWallet>,
}

/// Resolves the active wallet and keeps the smart account provisioned for it.
#[derive(Debug)]
pub struct WalletSession<P, A> {
    provider: Arc<P>,
    registry: AppChainRegistry,
    provisioner: SmartAccountProvisioner<A>,
    prefer_smart_wallet: bool,
}

impl<P: WalletProvider, A: AccountAbstraction> WalletSession<P, A> {
    pub fn new(
        provider: Arc<P>,
        registry: AppChainRegistry,
        provisioner: SmartAccountProvisioner<A>,
        prefer_smart_wallet: bool,
    ) -> Self {
        Self { provider, registry, provisioner, prefer_smart_wallet }
    }

    /// Builds a session with a fresh store from `config`.
    pub fn from_config(provider: Arc<P>, aa: A, config: &Config) -> Result<Self, ChainConfigError> {
        let registry = config.registry()?;
        let provisioner =
            SmartAccountProvisioner::new(aa, WalletStateStore::new(), config.provisioning.clone());
        Ok(Self::new(provider, registry, provisioner, config.prefer_smart_wallet))
    }

    pub fn store(&self) -> &WalletStateStore {
        self.provisioner.store()
    }

    pub fn registry(&self) -> &AppChainRegistry {
        &self.registry
    }

    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    fn projection(&self) -> WalletSetProjection {
        project(&self.provider.wallets())
    }

    pub fn active_wallet(&self) -> Option<ActiveWallet> {
        let client = self.store().smart_client();
        resolve(&self.projection(), self.provider.session(), client.as_deref(), self.prefer_smart_wallet)
    }

    /// Whether the authenticated user owns the active wallet.
    pub fn is_connected_user_a_linked_account(&self) -> bool {
        self.provider.user().is_some() && self.active_wallet().is_some_and(|wallet| wallet.linked)
    }

    pub fn snapshot(&self) -> WalletSnapshot {
        self.snapshot_of(&self.projection())
    }

    fn snapshot_of(&self, projection: &WalletSetProjection) -> WalletSnapshot {
        let auth = self.provider.session();
        let state = self.store().snapshot();
        let active = resolve(
            projection,
            auth,
            state.smart_client().map(|client| &**client),
            self.prefer_smart_wallet,
        );
        let ready_and_auth = auth.is_ready_and_authenticated();
        let wallet_chain_id = active.as_ref().map_or(0, |wallet| wallet.chain_id_numeric);

        WalletSnapshot {
            embedded: projection.embedded.clone().filter(|_| ready_and_auth),
            external: projection.external.clone().filter(|_| ready_and_auth),
            wallet_chain_id,
            is_wallet_authed: active.is_some(),
            wallet_address: active.as_ref().map(|wallet| wallet.address.to_string()).unwrap_or_default(),
            smart_wallet_address: state.smart_address(),
            app_chain_config: self.registry.lookup(wallet_chain_id).clone(),
            is_wrong_network: state.is_wrong_network(),
            prefer_smart_wallet: self.prefer_smart_wallet,
            ready: auth.ready,
            authenticated: auth.authenticated,
            ready_and_auth,
            linked_wallets: projection.linked.clone(),
            active,
        }
    }

    /// Re-derives the session from the provider.
    ///
    /// Flags the wrong network when the active wallet is on an unsupported chain and feeds the
    /// provisioner. Returns the fresh snapshot and the handle of a provisioning run if one
    /// started. Must be called from within a tokio runtime.
    pub fn sync(&self) -> (WalletSnapshot, Option<JoinHandle<ProvisionOutcome>>) {
        let projection = self.projection();
        let ready_and_auth = self.provider.session().is_ready_and_authenticated();

        let inputs = ready_and_auth
            .then(|| ProvisionInputs::select(&projection, &self.registry))
            .flatten();
        let run = self.provisioner.update(inputs);

        let active = resolve(
            &projection,
            self.provider.session(),
            self.store().smart_client().as_deref(),
            self.prefer_smart_wallet,
        );
        let wrong_network =
            active.is_some_and(|wallet| !self.registry.is_supported(wallet.chain_id_numeric));
        self.store().set_wrong_network(wrong_network);

        (self.snapshot_of(&projection), run)
    }
}

//! Shared wallet state.

use crate::account::SharedSmartAccountClient;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;

/// Whether the smart wallet approved the vault contract for its funds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalState {
    #[default]
    Pending,
    Approved,
    NotApproved,
}

/// Backend session verification state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionVerifyState {
    #[default]
    Pending,
    Verified,
    Unverified,
}

/// A snapshot of the shared wallet state.
#[derive(Clone, Debug, Default)]
pub struct WalletState {
    smart_client: Option<SharedSmartAccountClient>,
    client_generation: u64,
    is_wrong_network: bool,
    approval: ApprovalState,
    spend_allowance: U256,
    setup_complete: bool,
    session_verify: SessionVerifyState,
}

impl WalletState {
    pub fn smart_client(&self) -> Option<&SharedSmartAccountClient> {
        self.smart_client.as_ref()
    }

    pub fn smart_address(&self) -> Option<Address> {
        self.smart_client.as_ref().map(|client| client.account_address())
    }

    /// The latest provisioning generation issued.
    pub fn client_generation(&self) -> u64 {
        self.client_generation
    }

    pub fn is_wrong_network(&self) -> bool {
        self.is_wrong_network
    }

    pub fn approval(&self) -> ApprovalState {
        self.approval
    }

    pub fn spend_allowance(&self) -> U256 {
        self.spend_allowance
    }

    /// Smart account present, vault approved and a non-zero spend allowance.
    pub fn is_setup_complete(&self) -> bool {
        self.setup_complete
    }

    pub fn session_verify(&self) -> SessionVerifyState {
        self.session_verify
    }

    /// Swaps the smart client. Approval and allowance belong to one account and are reset when
    /// the account address changes.
    fn replace_client(&mut self, client: Option<SharedSmartAccountClient>) {
        let previous = self.smart_address();
        self.smart_client = client;
        if self.smart_address() != previous {
            self.approval = ApprovalState::Pending;
            self.spend_allowance = U256::ZERO;
        }
        self.recompute_setup_complete();
    }

    fn recompute_setup_complete(&mut self) {
        self.setup_complete = self.smart_client.is_some()
            && self.approval == ApprovalState::Approved
            && !self.spend_allowance.is_zero();
    }
}

/// The shared wallet state store.
///
/// Cheap to clone; all clones share one state. Every write replaces whole fields under the
/// store's lock and notifies subscribers when something changed.
#[derive(Clone, Debug)]
pub struct WalletStateStore {
    inner: Arc<watch::Sender<WalletState>>,
}

impl Default for WalletStateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl WalletStateStore {
    pub fn new() -> Self {
        Self { inner: Arc::new(watch::Sender::new(WalletState::default())) }
    }

    /// Returns a clone of the current state.
    pub fn snapshot(&self) -> WalletState {
        self.inner.borrow().clone()
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<WalletState> {
        self.inner.subscribe()
    }

    pub fn smart_client(&self) -> Option<SharedSmartAccountClient> {
        self.inner.borrow().smart_client.clone()
    }

    pub fn smart_address(&self) -> Option<Address> {
        self.inner.borrow().smart_address()
    }

    pub fn is_wrong_network(&self) -> bool {
        self.inner.borrow().is_wrong_network
    }

    pub fn approval(&self) -> ApprovalState {
        self.inner.borrow().approval
    }

    pub fn spend_allowance(&self) -> U256 {
        self.inner.borrow().spend_allowance
    }

    pub fn is_setup_complete(&self) -> bool {
        self.inner.borrow().setup_complete
    }

    pub fn session_verify(&self) -> SessionVerifyState {
        self.inner.borrow().session_verify
    }

    /// Issues a new provisioning generation, superseding every earlier one.
    ///
    /// With `clear_client` the current client is dropped right away, otherwise it stays until
    /// the new generation publishes.
    pub(crate) fn begin_client_generation(&self, clear_client: bool) -> u64 {
        let mut generation = 0;
        self.inner.send_modify(|state| {
            state.client_generation += 1;
            generation = state.client_generation;
            if clear_client {
                state.replace_client(None);
            }
        });
        generation
    }

    /// Publishes `client` if `generation` is still the latest one. Returns whether it was applied.
    pub(crate) fn publish_client(&self, generation: u64, client: SharedSmartAccountClient) -> bool {
        self.inner.send_if_modified(|state| {
            if state.client_generation != generation {
                return false;
            }
            state.replace_client(Some(client));
            true
        })
    }

    pub(crate) fn set_wrong_network(&self, is_wrong_network: bool) {
        self.inner.send_if_modified(|state| {
            let changed = state.is_wrong_network != is_wrong_network;
            state.is_wrong_network = is_wrong_network;
            changed
        });
    }

    pub(crate) fn set_approval(&self, approval: ApprovalState) {
        self.inner.send_modify(|state| {
            state.approval = approval;
            state.recompute_setup_complete();
        });
    }

    /// Writes `approval` only while `smart_address` is still the current smart account.
    pub(crate) fn set_approval_for(&self, smart_address: Address, approval: ApprovalState) -> bool {
        self.inner.send_if_modified(|state| {
            if state.smart_address() != Some(smart_address) {
                return false;
            }
            state.approval = approval;
            state.recompute_setup_complete();
            true
        })
    }

    pub(crate) fn set_spend_allowance(&self, allowance: U256) {
        self.inner.send_modify(|state| {
            state.spend_allowance = allowance;
            state.recompute_setup_complete();
        });
    }

    pub(crate) fn set_session_verify(&self, session_verify: SessionVerifyState) {
        self.inner.send_modify(|state| state.session_verify = session_verify);
    }
}

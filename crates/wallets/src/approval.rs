use crate::{
    error::ApprovalError,
    store::{ApprovalState, WalletStateStore},
    wallet::AuthSession,
};
use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use fare_config::ApprovalConfig;

/// Game contracts the smart wallet must approve before playing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AppContracts {
    pub bankroll: Option<Address>,
    pub vault: Option<Address>,
}

/// Answers whether a contract may move a fund owner's funds.
#[async_trait]
pub trait ApprovalOracle: Send + Sync {
    async fn is_valid_contract_for_fund_owner(
        &self,
        contract: Address,
        fund_owner: Address,
    ) -> Result<bool, ApprovalError>;
}

/// Checks whether the current smart wallet approved the vault and records the result.
#[derive(Debug)]
pub struct ApprovalChecker<O> {
    oracle: O,
    store: WalletStateStore,
    config: ApprovalConfig,
}

impl<O: ApprovalOracle> ApprovalChecker<O> {
    pub fn new(oracle: O, store: WalletStateStore, config: ApprovalConfig) -> Self {
        Self { oracle, store, config }
    }

    /// Runs the check.
    ///
    /// Returns `false` without touching the store while contracts, the smart account or auth
    /// are missing. Otherwise writes `Pending`, then `Approved` or `NotApproved`; lookup errors
    /// and timeouts count as not approved. A result for a smart account that was replaced in
    /// the meantime is dropped.
    pub async fn check(&self, contracts: AppContracts, auth: AuthSession) -> bool {
        let (Some(_bankroll), Some(vault)) = (contracts.bankroll, contracts.vault) else {
            return false;
        };
        let Some(smart_address) = self.store.smart_address() else { return false };
        if !auth.is_ready_and_authenticated() {
            return false;
        }

        self.store.set_approval(ApprovalState::Pending);
        let limit = self.config.timeout();
        let result = tokio::time::timeout(
            limit,
            self.oracle.is_valid_contract_for_fund_owner(vault, smart_address),
        )
        .await
        .unwrap_or(Err(ApprovalError::Timeout(limit)));

        let approved = match result {
            Ok(approved) => approved,
            Err(err) => {
                warn!(target: "wallets::approval", %err, %smart_address, "approval check failed");
                false
            }
        };
        let state = if approved { ApprovalState::Approved } else { ApprovalState::NotApproved };
        if !self.store.set_approval_for(smart_address, state) {
            debug!(target: "wallets::approval", %smart_address, "smart account changed during approval check");
            return false;
        }
        approved
    }

    /// Records the smart wallet's current spend allowance.
    pub fn set_spend_allowance(&self, allowance: U256) {
        self.store.set_spend_allowance(allowance);
    }
}

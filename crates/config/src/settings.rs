//! Smart account provisioning and approval-check settings.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How the paymaster sponsors user operations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymasterMode {
    /// Gas is fully sponsored.
    #[default]
    Sponsored,
    /// Gas is paid in an ERC-20 token through the paymaster.
    Erc20,
}

/// Context sent along with every paymaster request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymasterContext {
    pub mode: PaymasterMode,
    pub calculate_gas_limits: bool,
    /// Validity window of a sponsorship, in seconds.
    pub expiry_duration_secs: u64,
}

impl Default for PaymasterContext {
    fn default() -> Self {
        Self { mode: PaymasterMode::Sponsored, calculate_gas_limits: true, expiry_duration_secs: 300 }
    }
}

/// Bounds and policy for smart account client construction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvisioningConfig {
    /// Upper bound for acquiring the signer's EIP-1193 provider, per attempt.
    pub provider_timeout_ms: u64,
    /// Upper bound for a whole provisioning run.
    pub client_timeout_ms: u64,
    /// How often provider acquisition is retried after the first failure.
    pub max_retries: u32,
    /// Starting backoff between retries, doubled on every attempt.
    pub initial_backoff_ms: u64,
    /// Multiplier applied to fee estimates, in basis points (`12_500` = 1.25x).
    pub fee_multiplier_bps: u32,
    pub paymaster: PaymasterContext,
}

impl ProvisioningConfig {
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_millis(self.provider_timeout_ms)
    }

    pub fn client_timeout(&self) -> Duration {
        Duration::from_millis(self.client_timeout_ms)
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    /// Sets aggressive timeouts and no backoff; meant for tests and local dev chains.
    pub fn aggressive(self) -> Self {
        Self { provider_timeout_ms: 200, client_timeout_ms: 1_000, initial_backoff_ms: 1, ..self }
    }
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self {
            provider_timeout_ms: 30_000,
            client_timeout_ms: 60_000,
            max_retries: 2,
            initial_backoff_ms: 500,
            fee_multiplier_bps: 12_500,
            paymaster: PaymasterContext::default(),
        }
    }
}

/// Settings for the smart wallet contract approval check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApprovalConfig {
    pub timeout_ms: u64,
}

impl ApprovalConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ApprovalConfig {
    fn default() -> Self {
        Self { timeout_ms: 45_000 }
    }
}

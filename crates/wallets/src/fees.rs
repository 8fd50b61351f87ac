//! Gas fee estimation for user operations.

use crate::error::ProvisionError;
use alloy_eips::eip1559::Eip1559Estimation;
use alloy_primitives::U256;
use alloy_provider::{Provider, RootProvider};
use async_trait::async_trait;
use std::{fmt, sync::Arc};
use url::Url;

/// Basis points denominator, `10_000` = 1x.
pub const BPS: u128 = 10_000;

/// Estimates EIP-1559 fees for the next user operation.
#[async_trait]
pub trait FeeEstimator: Send + Sync + fmt::Debug {
    async fn estimate_fees(&self) -> Result<Eip1559Estimation, ProvisionError>;
}

pub type SharedFeeEstimator = Arc<dyn FeeEstimator>;

/// Fee estimates straight from a chain's public RPC endpoint.
#[derive(Clone, Debug)]
pub struct PublicClientFeeEstimator<P> {
    provider: P,
}

impl PublicClientFeeEstimator<RootProvider> {
    /// Connects to the public RPC endpoint at `url`.
    pub fn http(url: Url) -> Self {
        Self { provider: RootProvider::new_http(url) }
    }
}

impl<P> PublicClientFeeEstimator<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<P> FeeEstimator for PublicClientFeeEstimator<P>
where
    P: Provider + fmt::Debug,
{
    async fn estimate_fees(&self) -> Result<Eip1559Estimation, ProvisionError> {
        self.provider
            .estimate_eip1559_fees()
            .await
            .map_err(|err| ProvisionError::FeeEstimation(err.to_string()))
    }
}

/// Scales both fee components of an inner estimator by a multiplier in basis points.
#[derive(Clone, Debug)]
pub struct SafetyMarginFeeEstimator {
    inner: SharedFeeEstimator,
    multiplier_bps: u32,
}

impl SafetyMarginFeeEstimator {
    pub fn new(inner: SharedFeeEstimator, multiplier_bps: u32) -> Self {
        Self { inner, multiplier_bps }
    }

    pub fn multiplier_bps(&self) -> u32 {
        self.multiplier_bps
    }

    /// Applies the margin. Results above `u128::MAX` saturate.
    pub fn apply(&self, estimate: Eip1559Estimation) -> Eip1559Estimation {
        let scale = |fee: u128| {
            let scaled = U256::from(fee) * U256::from(self.multiplier_bps) / U256::from(BPS);
            u128::try_from(scaled).unwrap_or(u128::MAX)
        };
        Eip1559Estimation {
            max_fee_per_gas: scale(estimate.max_fee_per_gas),
            max_priority_fee_per_gas: scale(estimate.max_priority_fee_per_gas),
        }
    }
}

#[async_trait]
impl FeeEstimator for SafetyMarginFeeEstimator {
    async fn estimate_fees(&self) -> Result<Eip1559Estimation, ProvisionError> {
        let estimate = self.inner.estimate_fees().await?;
        let scaled = self.apply(estimate);
        trace!(target: "wallets::fees", ?estimate, ?scaled, "applied fee safety margin");
        Ok(scaled)
    }
}

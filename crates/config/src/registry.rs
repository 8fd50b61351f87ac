//! Lookup from numeric chain id to [AppChainConfig].

use crate::{chain::AppChainConfig, error::ChainConfigError};
use alloy_primitives::ChainId;
use std::collections::BTreeMap;

/// Immutable registry of supported chains with a guaranteed default entry.
///
/// Lookups never fail: unknown ids resolve to the default chain's configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppChainRegistry {
    configs: BTreeMap<ChainId, AppChainConfig>,
    default_chain_id: ChainId,
}

impl AppChainRegistry {
    /// Builds a registry from `configs`.
    ///
    /// Fails if an id is zero, if two entries share an id, if an entry's key disagrees with its
    /// chain definition, or if `default_chain_id` is not among them.
    pub fn new(
        configs: impl IntoIterator<Item = AppChainConfig>,
        default_chain_id: ChainId,
    ) -> Result<Self, ChainConfigError> {
        let mut map = BTreeMap::new();
        for config in configs {
            let id = config.chain_id;
            if id == 0 {
                return Err(ChainConfigError::ZeroChainId);
            }
            if config.chain.id != id {
                return Err(ChainConfigError::MismatchedChainId { key: id, chain: config.chain.id });
            }
            if map.insert(id, config).is_some() {
                return Err(ChainConfigError::DuplicateChain(id));
            }
        }
        if !map.contains_key(&default_chain_id) {
            return Err(ChainConfigError::MissingDefault(default_chain_id));
        }
        Ok(Self { configs: map, default_chain_id })
    }

    /// Returns the configuration for `chain_id`, or the default chain's configuration if the id
    /// is not supported.
    pub fn lookup(&self, chain_id: ChainId) -> &AppChainConfig {
        self.get(chain_id).unwrap_or_else(|| self.default_config())
    }

    /// Returns the configuration for `chain_id` without falling back.
    pub fn get(&self, chain_id: ChainId) -> Option<&AppChainConfig> {
        self.configs.get(&chain_id)
    }

    /// Returns `true` if `chain_id` has its own entry.
    pub fn is_supported(&self, chain_id: ChainId) -> bool {
        self.configs.contains_key(&chain_id)
    }

    pub fn default_chain_id(&self) -> ChainId {
        self.default_chain_id
    }

    pub fn default_config(&self) -> &AppChainConfig {
        &self.configs[&self.default_chain_id]
    }

    /// Iterates over supported chain ids in ascending order.
    pub fn chain_ids(&self) -> impl Iterator<Item = ChainId> + '_ {
        self.configs.keys().copied()
    }
}

impl Default for AppChainRegistry {
    fn default() -> Self {
        Self {
            configs: crate::presets::all().into_iter().map(|c| (c.chain_id, c)).collect(),
            default_chain_id: crate::presets::DEFAULT_APP_CHAIN_ID,
        }
    }
}

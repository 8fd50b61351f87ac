//! # fare-config
//!
//! Chain registry and wallet configuration.
//!
//! Configuration is layered with [figment]: built-in defaults, then `fare.toml`, then
//! `FARE_`-prefixed environment variables (nested keys separated by `__`).

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

#[macro_use]
extern crate tracing;

use alloy_primitives::ChainId;
use eyre::WrapErr;
use figment::{
    Figment, Metadata, Profile, Provider,
    providers::{Env, Format, Serialized, Toml},
    value::{Dict, Map},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod chain;
pub use chain::{
    AppChainConfig, BlockExplorer, ChainDefinition, CurrencyMetadata, NativeCurrency,
    format_chain_id, parse_chain_id,
};

pub mod error;
pub use error::{ChainConfigError, ExtractConfigError};

pub mod presets;
pub use presets::DEFAULT_APP_CHAIN_ID;

mod registry;
pub use registry::AppChainRegistry;

mod settings;
pub use settings::{ApprovalConfig, PaymasterContext, PaymasterMode, ProvisioningConfig};

// reexport so hosts can merge their own providers
pub use alloy_chains::NamedChain;
pub use figment;

/// Wallet configuration.
///
/// # Defaults
///
/// All chains from [presets] are supported, [`DEFAULT_APP_CHAIN_ID`] is the fallback chain and
/// smart wallets are preferred.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Chain used when the active wallet reports an unsupported chain.
    pub default_chain_id: ChainId,
    /// Whether the smart account replaces the embedded wallet as the active identity.
    pub prefer_smart_wallet: bool,
    /// Supported chains, `[[chains]]` in `fare.toml`.
    pub chains: Vec<AppChainConfig>,
    pub provisioning: ProvisioningConfig,
    pub approval: ApprovalConfig,
}

impl Config {
    /// The file name looked up by [Config::load].
    pub const FILE_NAME: &'static str = "fare.toml";

    /// The prefix of environment variables overriding file values.
    pub const ENV_PREFIX: &'static str = "FARE_";

    /// Loads the config from `fare.toml` in the current directory and the environment.
    pub fn load() -> eyre::Result<Self> {
        Self::load_with_root(".")
    }

    /// Loads the config from `<root>/fare.toml` and the environment, and validates its chains.
    pub fn load_with_root(root: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = root.as_ref().join(Self::FILE_NAME);
        let config = Self::try_from(Self::figment_with_file(&path))?;
        config.registry().wrap_err_with(|| format!("invalid chain configuration in {path:?}"))?;
        Ok(config)
    }

    /// Attempts to extract a `Config` from `provider`, returning the result.
    ///
    /// # Example
    ///
    /// ```rust
    /// use fare_config::{
    ///     Config,
    ///     figment::providers::{Format, Toml},
    /// };
    ///
    /// let figment = Config::figment().merge(Toml::file("other.toml"));
    ///
    /// let config = Config::try_from(figment);
    /// ```
    pub fn try_from<T: Provider>(provider: T) -> Result<Self, ExtractConfigError> {
        trace!(target: "config", "load config with provider: {:?}", provider.metadata());
        Figment::from(provider).extract::<Self>().map_err(ExtractConfigError::new)
    }

    /// Returns the default figment merged with `fare.toml` and the environment.
    pub fn figment() -> Figment {
        Self::figment_with_file(Self::FILE_NAME)
    }

    fn figment_with_file(path: impl AsRef<Path>) -> Figment {
        Figment::from(Self::default())
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(Self::ENV_PREFIX).split("__"))
    }

    /// Builds the chain registry this config describes.
    pub fn registry(&self) -> Result<AppChainRegistry, ChainConfigError> {
        AppChainRegistry::new(self.chains.iter().cloned(), self.default_chain_id)
    }
}

impl Provider for Config {
    fn metadata(&self) -> Metadata {
        Metadata::named("Fare Wallet Config")
    }

    #[track_caller]
    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        Serialized::defaults(self).data()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_chain_id: DEFAULT_APP_CHAIN_ID,
            prefer_smart_wallet: true,
            chains: presets::all(),
            provisioning: ProvisioningConfig::default(),
            approval: ApprovalConfig::default(),
        }
    }
}

//! # fare-wallets
//!
//! Active wallet resolution and smart account provisioning.
//!
//! The wallet provider reports a set of wallets. [`project`] picks out the linked ones,
//! [`resolve`] turns them into one [ActiveWallet], and the [SmartAccountProvisioner] keeps a
//! smart account client bound to the signer wallet in the shared [WalletStateStore].
//! [WalletSession] wires these together; [AuthWalletLifecycle] drives login, link and logout.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

#[macro_use]
extern crate tracing;

pub mod account;
pub use account::{AccountAbstraction, PaymasterConfig, SharedSmartAccountClient, SmartAccountClient};

pub mod approval;
pub use approval::{AppContracts, ApprovalChecker, ApprovalOracle};

pub mod backend;
pub use backend::{BackendClient, VerificationService};

pub mod error;
pub use error::{ApprovalError, BackendError, ProviderError, ProvisionError, WalletParseError};

pub mod fees;
pub use fees::{FeeEstimator, PublicClientFeeEstimator, SafetyMarginFeeEstimator};

pub mod lifecycle;
pub use lifecycle::{AuthWalletLifecycle, LinkOrLogin};

mod projection;
pub use projection::{WalletSetProjection, project};

pub mod provider;
pub use provider::{LinkError, LinkMethod, LinkOutcome, LoginOutcome, WalletProvider};

pub mod provisioner;
pub use provisioner::{ProvisionInputs, ProvisionOutcome, SmartAccountProvisioner};

mod resolver;
pub use resolver::{ActiveWallet, ActiveWalletKind, resolve};

mod session;
pub use session::{WalletSession, WalletSnapshot};

mod signer;
pub use signer::Eip1193Signer;

pub mod store;
pub use store::{ApprovalState, SessionVerifyState, WalletState, WalletStateStore};

pub mod telemetry;
pub use telemetry::{
    ChannelTelemetry, NoopTelemetry, SupportChannel, TelemetryMessage, TelemetrySink,
    TracingTelemetry,
};

pub mod wallet;
pub use wallet::{
    AuthSession, EmbeddedWallet, Eip1193Provider, EthereumRequest, ExternalWallet, LinkedWallet,
    RawWallet, UserRecord, WalletConnector, WalletKind, parse_wallets,
};

pub use fare_config::parse_chain_id;

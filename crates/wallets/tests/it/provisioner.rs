use crate::{init_tracing, utils::*};
use alloy_primitives::{Address, U256, address};
use async_trait::async_trait;
use fare_config::{AppChainRegistry, ApprovalConfig, PaymasterMode, ProvisioningConfig, presets};
use fare_wallets::{
    AppContracts, ApprovalChecker, ApprovalError, ApprovalOracle, ApprovalState, AuthSession,
    ProvisionError, ProvisionInputs, ProvisionOutcome, SmartAccountProvisioner, WalletStateStore,
    project,
};
use std::{
    sync::{Arc, atomic::Ordering},
    time::Duration,
};

const SIGNER_A: Address = address!("0x000000000000000000000000000000000000000a");
const SIGNER_B: Address = address!("0x000000000000000000000000000000000000000b");
const SMART_A: Address = address!("0x00000000000000000000000000000000000000a1");
const SMART_B: Address = address!("0x00000000000000000000000000000000000000b1");
const BANKROLL: Address = address!("0x0000000000000000000000000000000000000ba0");
const VAULT: Address = address!("0x0000000000000000000000000000000000000fa0");

struct Approves;

#[async_trait]
impl ApprovalOracle for Approves {
    async fn is_valid_contract_for_fund_owner(&self, _: Address, _: Address) -> Result<bool, ApprovalError> {
        Ok(true)
    }
}

fn inputs(signer: Address, connector: Arc<FakeConnector>) -> ProvisionInputs {
    ProvisionInputs {
        signer: embedded_on(signer, "eip155:42161", connector),
        chain: presets::arbitrum(),
    }
}

fn provisioner(aa: FakeAa, config: ProvisioningConfig) -> SmartAccountProvisioner<FakeAa> {
    SmartAccountProvisioner::new(aa, WalletStateStore::new(), config)
}

#[tokio::test(start_paused = true)]
async fn stale_run_never_reaches_the_store() {
    init_tracing();
    let aa = FakeAa::default()
        .with_account(SIGNER_A, SMART_A, Duration::from_secs(5))
        .with_account(SIGNER_B, SMART_B, Duration::ZERO);
    let provisioner = provisioner(aa, ProvisioningConfig::default());

    let run_a = provisioner.update(Some(inputs(SIGNER_A, Arc::default()))).unwrap();
    let run_b = provisioner.update(Some(inputs(SIGNER_B, Arc::default()))).unwrap();

    let outcome_b = run_b.await.unwrap();
    assert!(outcome_b.is_published());
    assert_eq!(provisioner.store().smart_address(), Some(SMART_B));

    let outcome_a = run_a.await.unwrap();
    assert!(matches!(outcome_a, ProvisionOutcome::Superseded { .. }), "{outcome_a:?}");
    assert!(outcome_a.generation() < outcome_b.generation());
    assert_eq!(provisioner.store().smart_address(), Some(SMART_B));
}

#[tokio::test(start_paused = true)]
async fn concurrent_runs_publish_only_the_latest() {
    let aa = FakeAa::default()
        .with_account(SIGNER_A, SMART_A, Duration::ZERO)
        .with_account(SIGNER_B, SMART_B, Duration::from_secs(1));
    let provisioner = provisioner(aa, ProvisioningConfig::default());

    // the older run finishes first here, and is superseded all the same
    let run_a = provisioner.update(Some(inputs(SIGNER_A, Arc::default()))).unwrap();
    let run_b = provisioner.update(Some(inputs(SIGNER_B, Arc::default()))).unwrap();
    let (a, b) = futures::future::join(run_a, run_b).await;

    assert!(matches!(a.unwrap(), ProvisionOutcome::Superseded { .. }));
    assert!(b.unwrap().is_published());
    assert_eq!(provisioner.store().smart_address(), Some(SMART_B));
}

#[tokio::test]
async fn unchanged_inputs_do_not_rerun() {
    let aa = FakeAa::default().with_account(SIGNER_A, SMART_A, Duration::ZERO);
    let provisioner = provisioner(aa, ProvisioningConfig::default());
    let connector = Arc::new(FakeConnector::default());

    let run = provisioner.update(Some(inputs(SIGNER_A, connector.clone()))).unwrap();
    assert!(run.await.unwrap().is_published());
    assert!(provisioner.update(Some(inputs(SIGNER_A, connector.clone()))).is_none());
    assert_eq!(connector.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn passes_bundler_and_sponsored_paymaster() {
    let aa = FakeAa::default().with_account(SIGNER_A, SMART_A, Duration::ZERO);
    let built = aa.built.clone();
    let provisioner = provisioner(aa, ProvisioningConfig::default());

    provisioner.update(Some(inputs(SIGNER_A, Arc::default()))).unwrap().await.unwrap();

    let arbitrum = presets::arbitrum();
    let built = built.lock();
    let (bundler, paymaster) = &built[0];
    assert_eq!(bundler, &arbitrum.bundler_url);
    assert_eq!(paymaster.url, arbitrum.paymaster_url);
    assert_eq!(paymaster.context.mode, PaymasterMode::Sponsored);
}

#[tokio::test(start_paused = true)]
async fn retries_provider_acquisition_with_backoff() {
    let aa = FakeAa::default().with_account(SIGNER_A, SMART_A, Duration::ZERO);
    let provisioner = provisioner(aa, ProvisioningConfig::default());
    let connector = Arc::new(FakeConnector::failing(2));

    let outcome = provisioner.update(Some(inputs(SIGNER_A, connector.clone()))).unwrap().await.unwrap();
    assert!(outcome.is_published(), "{outcome:?}");
    assert_eq!(connector.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn gives_up_after_max_retries() {
    let aa = FakeAa::default().with_account(SIGNER_A, SMART_A, Duration::ZERO);
    let provisioner = provisioner(aa, ProvisioningConfig::default());
    let connector = Arc::new(FakeConnector::failing(3));

    let outcome = provisioner.update(Some(inputs(SIGNER_A, connector.clone()))).unwrap().await.unwrap();
    assert!(
        matches!(outcome, ProvisionOutcome::Failed { error: ProvisionError::Provider(_), .. }),
        "{outcome:?}"
    );
    assert_eq!(connector.calls.load(Ordering::SeqCst), 3);
    assert_eq!(provisioner.store().smart_address(), None);
}

#[tokio::test(start_paused = true)]
async fn failed_inputs_can_be_retried() {
    let aa = FakeAa::default().with_account(SIGNER_A, SMART_A, Duration::ZERO);
    let provisioner = provisioner(aa, ProvisioningConfig::default());
    let connector = Arc::new(FakeConnector::failing(3));

    let outcome = provisioner.update(Some(inputs(SIGNER_A, connector.clone()))).unwrap().await.unwrap();
    assert!(matches!(outcome, ProvisionOutcome::Failed { .. }), "{outcome:?}");

    // the provider recovered, same inputs run again
    let outcome = provisioner.update(Some(inputs(SIGNER_A, connector.clone()))).unwrap().await.unwrap();
    assert!(outcome.is_published(), "{outcome:?}");
    assert_eq!(connector.calls.load(Ordering::SeqCst), 4);
    assert_eq!(provisioner.store().smart_address(), Some(SMART_A));

    assert!(provisioner.update(Some(inputs(SIGNER_A, connector))).is_none());
}

#[tokio::test]
async fn retrying_a_failed_chain_keeps_the_previous_client() {
    let aa = FakeAa::default()
        .with_account(SIGNER_A, SMART_A, Duration::ZERO)
        .failing_on(presets::base().chain_id);
    let provisioner = provisioner(aa, ProvisioningConfig::default());
    provisioner.update(Some(inputs(SIGNER_A, Arc::default()))).unwrap().await.unwrap();

    let on_base = || ProvisionInputs {
        signer: embedded_on(SIGNER_A, "eip155:42161", Arc::default()),
        chain: presets::base(),
    };
    provisioner.update(Some(on_base())).unwrap().await.unwrap();
    let outcome = provisioner.update(Some(on_base())).unwrap().await.unwrap();
    assert!(matches!(outcome, ProvisionOutcome::Failed { .. }));
    assert_eq!(provisioner.store().smart_address(), Some(SMART_A));
}

#[tokio::test]
async fn new_smart_account_needs_its_own_approval() {
    let aa = FakeAa::default()
        .with_account(SIGNER_A, SMART_A, Duration::ZERO)
        .with_account(SIGNER_B, SMART_B, Duration::ZERO);
    let provisioner = provisioner(aa, ProvisioningConfig::default());
    let store = provisioner.store().clone();
    let checker = ApprovalChecker::new(Approves, store.clone(), ApprovalConfig::default());
    let contracts = AppContracts { bankroll: Some(BANKROLL), vault: Some(VAULT) };

    provisioner.update(Some(inputs(SIGNER_A, Arc::default()))).unwrap().await.unwrap();
    assert!(checker.check(contracts, AuthSession::new(true, true)).await);
    checker.set_spend_allowance(U256::from(1));
    assert!(store.is_setup_complete());

    provisioner.update(Some(inputs(SIGNER_B, Arc::default()))).unwrap().await.unwrap();
    assert_eq!(store.smart_address(), Some(SMART_B));
    assert_eq!(store.approval(), ApprovalState::Pending);
    assert_eq!(store.spend_allowance(), U256::ZERO);
    assert!(!store.is_setup_complete());
}

#[tokio::test(start_paused = true)]
async fn hanging_provider_times_out() {
    let aa = FakeAa::default().with_account(SIGNER_A, SMART_A, Duration::ZERO);
    let provisioner = provisioner(aa, ProvisioningConfig::default().aggressive());

    let outcome = provisioner
        .update(Some(inputs(SIGNER_A, Arc::new(FakeConnector::hanging()))))
        .unwrap()
        .await
        .unwrap();
    assert!(
        matches!(outcome, ProvisionOutcome::Failed { error: ProvisionError::Timeout(..), .. }),
        "{outcome:?}"
    );
}

#[tokio::test(start_paused = true)]
async fn slow_account_derivation_hits_the_client_timeout() {
    let aa = FakeAa::default().with_account(SIGNER_A, SMART_A, Duration::from_secs(120));
    let provisioner = provisioner(aa, ProvisioningConfig::default());

    let outcome = provisioner.update(Some(inputs(SIGNER_A, Arc::default()))).unwrap().await.unwrap();
    let ProvisionOutcome::Failed { error: ProvisionError::Timeout(limit, _), .. } = outcome else {
        panic!("expected timeout, got {outcome:?}");
    };
    assert_eq!(limit, Duration::from_secs(60));
}

#[tokio::test]
async fn failure_keeps_last_known_good_client() {
    let aa = FakeAa::default()
        .with_account(SIGNER_A, SMART_A, Duration::ZERO)
        .failing_on(presets::base().chain_id);
    let provisioner = provisioner(aa, ProvisioningConfig::default());

    provisioner.update(Some(inputs(SIGNER_A, Arc::default()))).unwrap().await.unwrap();
    assert_eq!(provisioner.store().smart_address(), Some(SMART_A));

    let on_base = ProvisionInputs {
        signer: embedded_on(SIGNER_A, "eip155:42161", Arc::default()),
        chain: presets::base(),
    };
    let outcome = provisioner.update(Some(on_base)).unwrap().await.unwrap();
    assert!(matches!(outcome, ProvisionOutcome::Failed { .. }));
    assert_eq!(provisioner.store().smart_address(), Some(SMART_A));
}

#[tokio::test]
async fn signer_removal_clears_the_client() {
    let aa = FakeAa::default().with_account(SIGNER_A, SMART_A, Duration::ZERO);
    let provisioner = provisioner(aa, ProvisioningConfig::default());

    provisioner.update(Some(inputs(SIGNER_A, Arc::default()))).unwrap().await.unwrap();
    assert!(provisioner.update(None).is_none());
    assert_eq!(provisioner.store().smart_address(), None);
}

#[test]
fn selects_embedded_signer_on_its_chain() {
    let registry = AppChainRegistry::default();
    let wallets = [external("eip155:42161"), embedded("eip155:8453")];

    let selected = ProvisionInputs::select(&project(&wallets), &registry).unwrap();
    assert_eq!(selected.signer.address(), EMBEDDED);
    assert_eq!(selected.chain.chain_id, 8453);

    let selected = ProvisionInputs::select(&project(&wallets[..1]), &registry).unwrap();
    assert_eq!(selected.signer.address(), EXTERNAL);

    // unsupported chains provision on the default chain
    let selected = ProvisionInputs::select(&project(&[embedded("eip155:10")]), &registry).unwrap();
    assert_eq!(selected.chain.chain_id, registry.default_chain_id());

    assert!(ProvisionInputs::select(&project(&[]), &registry).is_none());
}

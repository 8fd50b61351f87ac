use crate::utils::*;
use fare_config::{Config, DEFAULT_APP_CHAIN_ID};
use fare_wallets::{ActiveWalletKind, AuthSession, WalletSession};
use std::{sync::Arc, time::Duration};

fn session(provider: FakeProvider, prefer_smart_wallet: bool) -> WalletSession<FakeProvider, FakeAa> {
    let aa = FakeAa::default().with_account(EMBEDDED, SMART, Duration::ZERO);
    let config = Config { prefer_smart_wallet, ..Default::default() };
    WalletSession::from_config(Arc::new(provider), aa, &config).unwrap()
}

#[tokio::test]
async fn smart_wallet_becomes_active_once_provisioned() {
    let session = session(FakeProvider::with_wallets(vec![embedded("eip155:42161")]), true);
    assert!(session.snapshot().active.is_none());

    let (snapshot, run) = session.sync();
    assert!(snapshot.active.is_none());
    assert!(run.unwrap().await.unwrap().is_published());

    let snapshot = session.snapshot();
    let active = snapshot.active.unwrap();
    assert_eq!(active.kind, ActiveWalletKind::Smart);
    assert_eq!(active.address, SMART);
    assert_eq!(active.underlying_embedded_address, Some(EMBEDDED));
    assert_eq!(snapshot.wallet_address, SMART.to_string());
    assert_eq!(snapshot.smart_wallet_address, Some(SMART));
    assert_eq!(snapshot.wallet_chain_id, 42161);
    assert!(snapshot.is_wallet_authed);
    assert!(!snapshot.is_wrong_network);

    // nothing changed, nothing to provision
    assert!(session.sync().1.is_none());
}

#[tokio::test]
async fn unsupported_chain_is_the_wrong_network() {
    let session = session(
        FakeProvider::with_wallets(vec![embedded("eip155:1"), external("eip155:10")]),
        false,
    );
    let (snapshot, _) = session.sync();

    let active = snapshot.active.unwrap();
    assert_eq!(active.address, EXTERNAL);
    assert_eq!(snapshot.wallet_chain_id, 10);
    assert!(snapshot.is_wrong_network);
    assert!(session.store().is_wrong_network());
    assert_eq!(snapshot.app_chain_config.chain_id, DEFAULT_APP_CHAIN_ID);
    assert_eq!(snapshot.linked_wallets.len(), 2);
}

#[tokio::test]
async fn supported_chain_clears_the_wrong_network_flag() {
    let provider = FakeProvider::with_wallets(vec![external("eip155:10")]);
    let session = session(provider, false);
    assert!(session.sync().0.is_wrong_network);

    *session.provider().wallets.lock() = vec![external("eip155:8453")];
    let (snapshot, _) = session.sync();
    assert!(!snapshot.is_wrong_network);
    assert_eq!(snapshot.app_chain_config.chain_id, 8453);
}

#[tokio::test]
async fn nothing_resolves_before_authentication() {
    let provider = FakeProvider::with_wallets(vec![embedded("eip155:42161"), external("eip155:42161")]);
    *provider.session.lock() = AuthSession::new(true, false);
    let session = session(provider, false);

    let (snapshot, run) = session.sync();
    assert!(run.is_none());
    assert!(snapshot.active.is_none());
    assert!(snapshot.embedded.is_none());
    assert!(snapshot.external.is_none());
    assert_eq!(snapshot.wallet_chain_id, 0);
    assert_eq!(snapshot.wallet_address, "");
    assert!(!snapshot.ready_and_auth);
    assert_eq!(snapshot.app_chain_config.chain_id, DEFAULT_APP_CHAIN_ID);
}

#[tokio::test]
async fn logging_out_drops_the_smart_account() {
    let session = session(FakeProvider::with_wallets(vec![embedded("eip155:42161")]), true);
    session.sync().1.unwrap().await.unwrap();
    assert_eq!(session.store().smart_address(), Some(SMART));

    *session.provider().session.lock() = AuthSession::new(true, false);
    session.sync();
    assert_eq!(session.store().smart_address(), None);
}

#[tokio::test]
async fn linked_account_check_needs_a_user() {
    let session = session(FakeProvider::with_wallets(vec![external("eip155:42161")]), false);
    assert!(!session.is_connected_user_a_linked_account());

    *session.provider().user.lock() = Some(user(Some(EXTERNAL)));
    assert!(session.is_connected_user_a_linked_account());
}

//! Login, link and logout flows.
//!
//! None of these flows return errors. Provider and backend failures are logged, reported to
//! telemetry and the support channel, and turned into state transitions.

use crate::{
    backend::VerificationService,
    error::ProviderError,
    provider::{LinkError, LinkMethod, LoginOutcome, WalletProvider},
    resolver::ActiveWallet,
    store::{SessionVerifyState, WalletStateStore},
    telemetry::{SupportChannel, TelemetrySink},
    wallet::{LinkedWallet, UserRecord},
};
use alloy_primitives::Address;
use serde_json::json;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

pub const SUPPORT_LOGIN_FAILED: &str = "We could not log you in. Please try again or contact support.";
pub const SUPPORT_CONNECT_FAILED: &str = "We could not connect your wallet. Please try again or contact support.";
pub const SUPPORT_LINK_FAILED: &str = "We could not link your wallet. Please try again or contact support.";

/// What [`AuthWalletLifecycle::link_or_login_wallet`] decided to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkOrLogin {
    /// Log out, then log in again once logout completes.
    Relogin,
    Login,
}

impl LinkOrLogin {
    pub fn decide(has_active_wallet: bool, is_linked_account: bool, has_user: bool) -> Self {
        match (has_active_wallet, is_linked_account, has_user) {
            (true, _, _) => Self::Relogin,
            (false, false, true) => Self::Relogin,
            _ => Self::Login,
        }
    }
}

/// Orchestrates the auth and wallet lifecycle.
#[derive(Debug)]
pub struct AuthWalletLifecycle<P, B> {
    provider: Arc<P>,
    backend: Arc<B>,
    store: WalletStateStore,
    telemetry: Arc<dyn TelemetrySink>,
    support: Arc<dyn SupportChannel>,
    should_prompt_login: AtomicBool,
}

impl<P: WalletProvider, B: VerificationService> AuthWalletLifecycle<P, B> {
    pub fn new(
        provider: Arc<P>,
        backend: Arc<B>,
        store: WalletStateStore,
        telemetry: Arc<dyn TelemetrySink>,
        support: Arc<dyn SupportChannel>,
    ) -> Self {
        Self { provider, backend, store, telemetry, support, should_prompt_login: AtomicBool::new(false) }
    }

    /// Whether a login is scheduled for when the next logout completes.
    pub fn is_login_deferred(&self) -> bool {
        self.should_prompt_login.load(Ordering::SeqCst)
    }

    /// Whether the authenticated user owns the active wallet.
    pub fn is_connected_user_a_linked_account(&self, active: Option<&ActiveWallet>) -> bool {
        self.provider.user().is_some() && active.is_some_and(|wallet| wallet.linked)
    }

    /// Runs the provider login flow. Returns the user on success.
    pub async fn login(&self) -> Option<UserRecord> {
        match self.provider.login().await {
            Ok(outcome) => {
                self.on_login_complete(&outcome);
                Some(outcome.user)
            }
            Err(err) => {
                error!(target: "wallets::lifecycle", %err, "login failed");
                self.telemetry.emit("privy_login_error", json!({ "error": err.to_string() }));
                self.support.show_support(SUPPORT_LOGIN_FAILED);
                None
            }
        }
    }

    fn on_login_complete(&self, outcome: &LoginOutcome) {
        debug!(target: "wallets::lifecycle", user = %outcome.user.id, method = %outcome.login_method, "login complete");
        self.telemetry.emit(
            "privy_login_complete",
            json!({
                "userId": outcome.user.id,
                "loginMethod": outcome.login_method,
                "isNewUser": outcome.is_new_user,
            }),
        );

        let Some(wallet) = outcome.user.wallet else { return };
        let smart_wallet = outcome.user.smart_wallet;
        self.telemetry.emit(
            "privy_wallet_connected",
            wallet_properties(Some(wallet), smart_wallet, "privy_login"),
        );
        self.telemetry.emit(
            &format!("privy_{}_login", outcome.login_method),
            wallet_properties(Some(wallet), smart_wallet, &outcome.login_method),
        );
    }

    /// Logs out of the provider and the backend and resets session verification.
    ///
    /// Both teardown steps always run. A deferred login runs afterwards if the provider logout
    /// succeeded.
    pub async fn logout(&self) {
        let provider_ok = self.provider_logout().await;
        if let Err(err) = self.backend.logout().await {
            warn!(target: "wallets::lifecycle", %err, "backend logout failed");
        }
        self.store.set_session_verify(SessionVerifyState::Pending);
        if provider_ok {
            self.consume_deferred_login().await;
        }
    }

    /// Asks the provider to link a wallet if there is an active one.
    ///
    /// Returns whether an account was linked. Errors are reported, never returned.
    pub async fn link_wallet_to_user(&self, active: Option<&ActiveWallet>) -> bool {
        if active.is_none() {
            return false;
        }
        match self.provider.link_wallet().await {
            Ok(outcome) => {
                debug!(target: "wallets::lifecycle", user = %outcome.user.id, method = %outcome.link_method, "linked account");
                self.telemetry.emit(
                    "privy_linked_account",
                    json!({
                        "userId": outcome.user.id,
                        "linkMethod": outcome.link_method.to_string(),
                        "linkedAddress": outcome.linked_address,
                    }),
                );
                self.telemetry.emit(
                    "privy_wallet_linked",
                    wallet_properties(
                        outcome.user.wallet,
                        outcome.user.smart_wallet,
                        "privy_link_account",
                    ),
                );
                true
            }
            Err(err) => {
                self.on_link_error(err).await;
                false
            }
        }
    }

    async fn on_link_error(&self, LinkError { method, error }: LinkError) {
        error!(target: "wallets::lifecycle", %method, %error, "account link failed");
        self.telemetry.emit(
            "privy_link_account_error",
            json!({ "error": error.to_string(), "linkMethod": method.to_string() }),
        );
        self.support.show_support(SUPPORT_LINK_FAILED);

        if method == LinkMethod::Siwe && error == ProviderError::LinkedToAnotherUser {
            self.relogin().await;
        }
    }

    /// Either logs in or forces a logout followed by a fresh login.
    pub async fn link_or_login_wallet(&self, active: Option<&ActiveWallet>) -> LinkOrLogin {
        let decision = LinkOrLogin::decide(
            active.is_some(),
            self.is_connected_user_a_linked_account(active),
            self.provider.user().is_some(),
        );
        trace!(target: "wallets::lifecycle", ?decision, "link or login");
        match decision {
            LinkOrLogin::Relogin => self.relogin().await,
            LinkOrLogin::Login => {
                self.login().await;
            }
        }
        decision
    }

    /// Connects an external wallet. Returns it on success.
    pub async fn connect_external_wallet(&self) -> Option<LinkedWallet> {
        match self.provider.connect_wallet().await {
            Ok(wallet) => {
                let connector = match &wallet {
                    LinkedWallet::External(external) => external.connector.as_str(),
                    LinkedWallet::Embedded(_) => "embedded",
                };
                self.telemetry.emit(
                    "privy_connected_external_wallet",
                    json!({ "walletAddress": wallet.address(), "connector": connector }),
                );
                self.telemetry.emit(
                    "privy_wallet_connected",
                    json!({ "walletAddress": wallet.address(), "loginMethod": "external_wallet" }),
                );
                Some(wallet)
            }
            Err(err) => {
                error!(target: "wallets::lifecycle", %err, "wallet connection failed");
                self.telemetry.emit("privy_connect_wallet_error", json!({ "error": err.to_string() }));
                self.support.show_support(SUPPORT_CONNECT_FAILED);
                None
            }
        }
    }

    /// Verifies the backend session for the active wallet and records the result.
    ///
    /// Stays `Pending` while there is no active wallet or user.
    pub async fn verify_session(&self, active: Option<&ActiveWallet>, sync_socials: bool) -> SessionVerifyState {
        let (Some(active), Some(user)) = (active, self.provider.user()) else {
            return self.store.session_verify();
        };
        let state = match self.backend.verify_initial(active.address, &user.id, sync_socials).await {
            Ok(_) => SessionVerifyState::Verified,
            Err(err) => {
                warn!(target: "wallets::lifecycle", %err, address = %active.address, "session verification failed");
                SessionVerifyState::Unverified
            }
        };
        self.store.set_session_verify(state);
        state
    }

    /// Moves the backend session to `address`. Returns whether the backend accepted it.
    pub async fn switch_session(&self, address: Address) -> bool {
        match self.backend.switch_session_address(address).await {
            Ok(_) => true,
            Err(err) => {
                warn!(target: "wallets::lifecycle", %err, %address, "session switch failed");
                false
            }
        }
    }

    /// Logs out and back in. If the provider logout fails the pending login is dropped, so a
    /// later logout does not log the user back in.
    async fn relogin(&self) {
        self.should_prompt_login.store(true, Ordering::SeqCst);
        if self.provider_logout().await {
            self.consume_deferred_login().await;
        } else if self.should_prompt_login.swap(false, Ordering::SeqCst) {
            debug!(target: "wallets::lifecycle", "dropping deferred login after failed logout");
        }
    }

    async fn provider_logout(&self) -> bool {
        match self.provider.logout().await {
            Ok(()) => true,
            Err(err) => {
                warn!(target: "wallets::lifecycle", %err, "provider logout failed");
                false
            }
        }
    }

    async fn consume_deferred_login(&self) {
        if self.should_prompt_login.swap(false, Ordering::SeqCst) {
            debug!(target: "wallets::lifecycle", "running deferred login");
            self.login().await;
        }
    }
}

fn wallet_properties(
    wallet: Option<Address>,
    smart_wallet: Option<Address>,
    login_method: &str,
) -> serde_json::Value {
    json!({
        "walletAddress": wallet,
        "smartWalletAddress": smart_wallet,
        "loginMethod": login_method,
    })
}

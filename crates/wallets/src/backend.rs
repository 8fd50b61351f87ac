//! Backend session verification.

use crate::error::BackendError;
use alloy_primitives::Address;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Response of `POST /privy/logout`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutResponse {
    pub has_logged_out: bool,
}

/// Body of `POST /privy/verify/initial`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyInitialRequest {
    /// Lower-cased, `0x`-prefixed.
    pub public_address: String,
    #[serde(rename = "pId")]
    pub user_id: String,
    pub should_sync_socials: bool,
}

/// Response of `POST /privy/verify/initial`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub user_data: Value,
}

/// The backend's session verification endpoints.
#[async_trait]
pub trait VerificationService: Send + Sync {
    /// Invalidates the backend session.
    async fn logout(&self) -> Result<LogoutResponse, BackendError>;

    /// Verifies the auth provider's session for `address` and starts a backend session.
    async fn verify_initial(
        &self,
        address: Address,
        user_id: &str,
        sync_socials: bool,
    ) -> Result<VerifyResponse, BackendError>;

    /// Moves the backend session to `address`.
    async fn switch_session_address(&self, address: Address) -> Result<Value, BackendError>;
}

/// HTTP client for the backend, sending cookies along with every request.
#[derive(Clone, Debug)]
pub struct BackendClient {
    client: Client,
    base_url: Url,
}

impl BackendClient {
    /// Default request timeout.
    pub const TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(base_url: Url) -> Result<Self, BackendError> {
        let client = Client::builder().cookie_store(true).timeout(Self::TIMEOUT).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Stores the game config for the current session.
    pub async fn upsert_game_config(&self, game_config: Value) -> Result<Value, BackendError> {
        let body = serde_json::json!({ "gameConfig": game_config });
        self.send("game/upsert-game-config", |req| req.json(&body), Method::POST).await
    }

    fn url(&self, path: &str) -> Result<Url, BackendError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        path: &'static str,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
        method: Method,
    ) -> Result<T, BackendError> {
        let url = self.url(path)?;
        trace!(target: "wallets::backend", %method, %url, "sending backend request");
        let response = build(self.client.request(method, url)).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status { path, status });
        }
        Ok(response.json().await?)
    }
}

fn lower_hex(address: Address) -> String {
    format!("{address:#x}")
}

#[async_trait]
impl VerificationService for BackendClient {
    async fn logout(&self) -> Result<LogoutResponse, BackendError> {
        self.send("privy/logout", |req| req, Method::POST).await
    }

    async fn verify_initial(
        &self,
        address: Address,
        user_id: &str,
        sync_socials: bool,
    ) -> Result<VerifyResponse, BackendError> {
        let body = VerifyInitialRequest {
            public_address: lower_hex(address),
            user_id: user_id.to_string(),
            should_sync_socials: sync_socials,
        };
        self.send("privy/verify/initial", |req| req.json(&body), Method::POST).await
    }

    async fn switch_session_address(&self, address: Address) -> Result<Value, BackendError> {
        let query = [("publicAddress", lower_hex(address))];
        self.send("privy/verify/switch", |req| req.query(&query), Method::GET).await
    }
}

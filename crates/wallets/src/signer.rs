use crate::{
    error::ProviderError,
    wallet::{EthereumRequest, SharedProvider},
};
use alloy_primitives::{Address, B256, Bytes, ChainId, TxHash, hex};
use alloy_rpc_types_eth::TransactionRequest;
use alloy_signer::{Result, Signature, Signer};
use async_trait::async_trait;

/// A chain-bound signer backed by a wallet's EIP-1193 provider.
///
/// Wallet providers sign messages and send transactions, but never expose raw hash signing.
#[derive(Clone, Debug)]
pub struct Eip1193Signer {
    provider: SharedProvider,
    address: Address,
    chain_id: ChainId,
}

impl Eip1193Signer {
    pub fn new(provider: SharedProvider, address: Address, chain_id: ChainId) -> Self {
        Self { provider, address, chain_id }
    }

    pub fn provider(&self) -> &SharedProvider {
        &self.provider
    }

    /// Signs and submits `tx` in one step through `eth_sendTransaction`.
    pub async fn send_transaction(
        &self,
        mut tx: TransactionRequest,
    ) -> std::result::Result<TxHash, ProviderError> {
        tx.from.get_or_insert(self.address);
        tx.chain_id.get_or_insert(self.chain_id);
        let value = self.provider.request(EthereumRequest::SendTransaction([tx])).await?;
        serde_json::from_value(value).map_err(|err| ProviderError::Request {
            method: "eth_sendTransaction".to_string(),
            message: err.to_string(),
        })
    }
}

#[async_trait]
impl Signer for Eip1193Signer {
    async fn sign_hash(&self, _hash: &B256) -> Result<Signature> {
        Err(alloy_signer::Error::other(
            "wallet providers cannot sign raw hashes, use sign_message or send_transaction instead",
        ))
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Signature> {
        let request = EthereumRequest::PersonalSign(hex::encode_prefixed(message), self.address);
        let value = self.provider.request(request).await.map_err(alloy_signer::Error::other)?;
        let raw: Bytes = serde_json::from_value(value).map_err(alloy_signer::Error::other)?;
        Signature::from_raw(&raw).map_err(alloy_signer::Error::other)
    }

    fn address(&self) -> Address {
        self.address
    }

    fn chain_id(&self) -> Option<ChainId> {
        Some(self.chain_id)
    }

    fn set_chain_id(&mut self, chain_id: Option<ChainId>) {
        if let Some(id) = chain_id {
            self.chain_id = id;
        }
    }
}

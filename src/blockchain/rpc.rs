//! JSON-RPC network implementation backed by alloy.
//!
//! # Responsibilities
//! - Connect to JSON-RPC endpoints chosen per request
//! - Broadcast signed raw transactions and wait for their receipts
//! - Query native balances
//! - Bound every RPC call with a timeout

use std::sync::Arc;
use std::time::Duration;

use alloy::consensus::TxEnvelope;
use alloy::eips::eip2718::Decodable2718;
use alloy::network::ReceiptResponse;
use alloy::primitives::{Address, U256};
use alloy::providers::{Provider, ProviderBuilder};
use async_trait::async_trait;
use dashmap::DashMap;
use tokio::time::timeout;

use crate::blockchain::network::Network;
use crate::blockchain::types::{
    parse_endpoint, BlockchainError, BlockchainResult, BroadcastOutcome, TxReceipt,
};
use crate::config::NetworkConfig;

type DynProvider = Arc<dyn Provider + Send + Sync>;

/// Network collaborator talking to real nodes over HTTP JSON-RPC.
///
/// Providers are created lazily and cached per endpoint string.
pub struct RpcNetwork {
    providers: DashMap<String, DynProvider>,
    config: NetworkConfig,
    rpc_timeout: Duration,
    receipt_timeout: Duration,
}

impl RpcNetwork {
    /// Create a new RPC network from configuration. No connection is made here.
    pub fn new(config: NetworkConfig) -> Self {
        Self {
            providers: DashMap::new(),
            rpc_timeout: Duration::from_secs(config.rpc_timeout_secs),
            receipt_timeout: Duration::from_secs(config.receipt_timeout_secs),
            config,
        }
    }

    /// Get the cached provider for `endpoint`, connecting on first use.
    fn provider(&self, endpoint: &str) -> BlockchainResult<DynProvider> {
        if let Some(provider) = self.providers.get(endpoint) {
            return Ok(provider.value().clone());
        }

        let url = parse_endpoint(endpoint)?;
        let provider = Arc::new(ProviderBuilder::new().connect_http(url)) as DynProvider;
        tracing::debug!(endpoint = %endpoint, "Connected RPC provider");

        Ok(self
            .providers
            .entry(endpoint.to_string())
            .or_insert(provider)
            .value()
            .clone())
    }

    /// Number of endpoints with a cached provider.
    pub fn cached_endpoints(&self) -> usize {
        self.providers.len()
    }
}

#[async_trait]
impl Network for RpcNetwork {
    fn validate(&self, raw_tx: &[u8]) -> BlockchainResult<()> {
        if raw_tx.is_empty() {
            return Err(BlockchainError::InvalidPayload("empty payload".to_string()));
        }

        let mut buf = raw_tx;
        TxEnvelope::decode_2718(&mut buf)
            .map_err(|e| BlockchainError::InvalidPayload(e.to_string()))?;

        if !buf.is_empty() {
            return Err(BlockchainError::InvalidPayload(format!(
                "{} trailing bytes after transaction envelope",
                buf.len()
            )));
        }
        Ok(())
    }

    async fn broadcast(&self, raw_tx: Vec<u8>, endpoint: &str) -> BlockchainResult<BroadcastOutcome> {
        let provider = self.provider(endpoint)?;

        let pending = match timeout(self.rpc_timeout, provider.send_raw_transaction(&raw_tx)).await {
            Ok(Ok(pending)) => pending,
            Ok(Err(e)) => return Err(BlockchainError::Rpc(e.to_string())),
            Err(_) => return Err(BlockchainError::Timeout(self.config.rpc_timeout_secs)),
        };

        let tx_hash = pending.tx_hash().to_string();
        tracing::debug!(tx_hash = %tx_hash, endpoint = %endpoint, "Transaction accepted by node");

        match pending.with_timeout(Some(self.receipt_timeout)).get_receipt().await {
            Ok(receipt) => Ok(BroadcastOutcome::Mined(TxReceipt {
                transaction_hash: receipt.transaction_hash().to_string(),
                success: receipt.status(),
                block_number: receipt.block_number(),
                gas_used: receipt.gas_used(),
            })),
            Err(e) => {
                tracing::warn!(tx_hash = %tx_hash, error = %e, "Receipt not available");
                Ok(BroadcastOutcome::Pending {
                    tx_hash,
                    reason: e.to_string(),
                })
            }
        }
    }

    async fn balance(&self, address: Address, endpoint: &str) -> BlockchainResult<U256> {
        let provider = self.provider(endpoint)?;

        match timeout(self.rpc_timeout, provider.get_balance(address)).await {
            Ok(Ok(balance)) => Ok(balance),
            Ok(Err(e)) => Err(BlockchainError::Rpc(e.to_string())),
            Err(_) => Err(BlockchainError::Timeout(self.config.rpc_timeout_secs)),
        }
    }
}

impl std::fmt::Debug for RpcNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcNetwork")
            .field("endpoints", &self.providers.len())
            .field("rpc_timeout_secs", &self.config.rpc_timeout_secs)
            .field("receipt_timeout_secs", &self.config.receipt_timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::consensus::{SignableTransaction, TxLegacy};
    use alloy::eips::eip2718::Encodable2718;
    use alloy::primitives::{Bytes, TxKind};
    use alloy::signers::local::PrivateKeySigner;
    use alloy::signers::SignerSync;

    fn test_config() -> NetworkConfig {
        NetworkConfig {
            default_endpoint: "http://127.0.0.1:1".to_string(),
            chain_id: 31337,
            rpc_timeout_secs: 2,
            receipt_timeout_secs: 2,
        }
    }

    fn signed_transfer() -> Vec<u8> {
        let signer = PrivateKeySigner::random();
        let tx = TxLegacy {
            chain_id: Some(31337),
            nonce: 0,
            gas_price: 1_000_000_000,
            gas_limit: 21_000,
            to: TxKind::Call(Address::ZERO),
            value: U256::from(1u64),
            input: Bytes::new(),
        };
        let signature = signer.sign_hash_sync(&tx.signature_hash()).unwrap();
        let envelope: TxEnvelope = tx.into_signed(signature).into();
        envelope.encoded_2718()
    }

    #[test]
    fn test_validate_accepts_signed_envelope() {
        let network = RpcNetwork::new(test_config());
        assert!(network.validate(&signed_transfer()).is_ok());
    }

    #[test]
    fn test_validate_rejects_garbage() {
        let network = RpcNetwork::new(test_config());

        let err = network.validate(&[]).unwrap_err();
        assert!(err.to_string().contains("empty payload"));

        assert!(network.validate(b"definitely not rlp").is_err());

        let mut padded = signed_transfer();
        padded.push(0);
        let err = network.validate(&padded).unwrap_err();
        assert!(err.to_string().contains("trailing bytes"));
    }

    #[tokio::test]
    async fn test_invalid_endpoint() {
        let network = RpcNetwork::new(test_config());
        let result = network.broadcast(signed_transfer(), "not-a-url").await;
        assert!(matches!(result, Err(BlockchainError::InvalidEndpoint { .. })));
        assert_eq!(network.cached_endpoints(), 0);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint() {
        // Nothing listens on port 1, so the request fails instead of hanging
        let network = RpcNetwork::new(test_config());
        let result = network.balance(Address::ZERO, "http://127.0.0.1:1").await;
        assert!(result.is_err());
        assert_eq!(network.cached_endpoints(), 1);
    }
}

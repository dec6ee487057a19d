//! Shared utilities for relay integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use tx_relay::blockchain::{BlockchainError, BlockchainResult, BroadcastOutcome, Network, TxReceipt};
use tx_relay::config::EngineConfig;
use tx_relay::{Receipt, RelayClient, RelayConfig};

pub const ENDPOINT: &str = "http://localhost:8545";

/// First payload byte that makes the mock fail the broadcast.
pub const FAIL: u8 = 0xee;
/// First payload byte that makes the mock report a pending transaction.
pub const PENDING: u8 = 0xdd;

/// Scripted network driven by the payload itself.
///
/// - first byte `FAIL` → RPC error
/// - first byte `PENDING` → accepted but no receipt
/// - otherwise first byte × 10ms delay, then mined
/// - payload `b"bad"` → rejected at submit time
///
/// The transaction hash is the hex of the payload, so receipts can be
/// matched back to what was sent.
#[derive(Default)]
pub struct MockNetwork {
    pub broadcasts: AtomicUsize,
}

pub fn tx_hash_of(payload: &[u8]) -> String {
    alloy::hex::encode_prefixed(payload)
}

/// Payload that mines after `delay_10ms` × 10ms and carries `tag`.
pub fn payload(delay_10ms: u8, tag: &str) -> Vec<u8> {
    let mut bytes = vec![delay_10ms];
    bytes.extend_from_slice(tag.as_bytes());
    bytes
}

#[async_trait]
impl Network for MockNetwork {
    fn validate(&self, raw_tx: &[u8]) -> BlockchainResult<()> {
        if raw_tx == b"bad" {
            return Err(BlockchainError::InvalidPayload("not a transaction".to_string()));
        }
        Ok(())
    }

    async fn broadcast(&self, raw_tx: Vec<u8>, _endpoint: &str) -> BlockchainResult<BroadcastOutcome> {
        self.broadcasts.fetch_add(1, Ordering::SeqCst);

        match raw_tx[0] {
            FAIL => Err(BlockchainError::Rpc("nonce too low".to_string())),
            PENDING => Ok(BroadcastOutcome::Pending {
                tx_hash: tx_hash_of(&raw_tx),
                reason: "receipt timeout".to_string(),
            }),
            delay => {
                tokio::time::sleep(Duration::from_millis(delay as u64 * 10)).await;
                Ok(BroadcastOutcome::Mined(TxReceipt {
                    transaction_hash: tx_hash_of(&raw_tx),
                    success: true,
                    block_number: Some(1),
                    gas_used: 21_000,
                }))
            }
        }
    }

    async fn balance(&self, _address: Address, _endpoint: &str) -> BlockchainResult<U256> {
        Ok(U256::from(1_000_000_000_000_000_000u128))
    }
}

pub fn config(poll_interval_ms: u64) -> RelayConfig {
    RelayConfig {
        engine: EngineConfig {
            worker_threads: 2,
            poll_interval_ms,
        },
        ..Default::default()
    }
}

pub fn client(poll_interval_ms: u64) -> (RelayClient, Arc<MockNetwork>) {
    let network = Arc::new(MockNetwork::default());
    let client = RelayClient::with_network(config(poll_interval_ms), network.clone()).unwrap();
    (client, network)
}

/// Register a callback that records every receipt, in delivery order.
pub fn record_receipts(client: &RelayClient) -> Arc<Mutex<Vec<Receipt>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    client
        .set_callback(move |receipt| sink.lock().unwrap().push(receipt.clone()))
        .unwrap();
    seen
}

/// Poll `condition` every 10ms until it holds or `limit` passes.
pub fn wait_until(limit: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + limit;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    condition()
}

//! Network collaborator interface.
//!
//! The submission engine only talks to the chain through this trait, which
//! keeps the job lifecycle independent of any particular RPC transport.

use alloy::primitives::{Address, U256};
use async_trait::async_trait;

use crate::blockchain::types::{BlockchainResult, BroadcastOutcome};

/// Broadcasts signed transactions and answers balance queries.
///
/// Implementations must be safe for concurrent use: the engine drives one
/// broadcast per job on a multi-threaded runtime.
#[async_trait]
pub trait Network: Send + Sync {
    /// Cheap synchronous check run at submit time, before the job is queued.
    ///
    /// A rejection here means the job never enters the queue and no receipt
    /// is produced for it.
    fn validate(&self, _raw_tx: &[u8]) -> BlockchainResult<()> {
        Ok(())
    }

    /// Send a signed raw transaction to `endpoint` and wait for its outcome.
    async fn broadcast(&self, raw_tx: Vec<u8>, endpoint: &str) -> BlockchainResult<BroadcastOutcome>;

    /// Native token balance of `address` as seen by `endpoint`.
    async fn balance(&self, address: Address, endpoint: &str) -> BlockchainResult<U256>;
}

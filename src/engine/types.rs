//! Job, receipt and error types shared by the engine and the client facade.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::blockchain::{BlockchainError, BroadcastOutcome};

/// Caller-chosen job identifier.
///
/// Opaque to the relay and not required to be unique; it is only echoed back
/// in the receipt so the caller can correlate completions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for JobId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One signed transaction waiting to be broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    /// Signed raw transaction bytes.
    pub raw_tx: Vec<u8>,
    /// JSON-RPC endpoint to broadcast to.
    pub endpoint: String,
    /// Caller's correlation ID.
    pub job_id: JobId,
}

impl SubmissionRequest {
    pub fn new(raw_tx: Vec<u8>, endpoint: impl Into<String>, job_id: impl Into<JobId>) -> Self {
        Self {
            raw_tx,
            endpoint: endpoint.into(),
            job_id: job_id.into(),
        }
    }
}

/// Completion record for one accepted job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Transaction hash, empty when the node never accepted the transaction.
    pub transaction_hash: String,
    /// Whether the transaction was mined and executed successfully.
    pub success: bool,
    /// Status or error text; empty on success.
    pub message: String,
    /// Job ID from the originating request.
    pub job_id: JobId,
}

impl Receipt {
    /// Build the receipt for a finished broadcast.
    pub fn from_outcome(job_id: JobId, outcome: Result<BroadcastOutcome, BlockchainError>) -> Self {
        match outcome {
            Ok(BroadcastOutcome::Mined(receipt)) if receipt.success => Self {
                transaction_hash: receipt.transaction_hash,
                success: true,
                message: String::new(),
                job_id,
            },
            Ok(BroadcastOutcome::Mined(receipt)) => Self {
                transaction_hash: receipt.transaction_hash,
                success: false,
                message: "transaction reverted".to_string(),
                job_id,
            },
            Ok(BroadcastOutcome::Pending { tx_hash, reason }) => Self {
                transaction_hash: tx_hash,
                success: false,
                message: format!("transaction pending: {}", reason),
                job_id,
            },
            Err(e) => Self {
                transaction_hash: String::new(),
                success: false,
                message: e.to_string(),
                job_id,
            },
        }
    }
}

/// Result of a single poll for a completed job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// A receipt was dequeued.
    Ready(Receipt),
    /// Nothing completed yet; try again.
    NotReady,
}

/// Engine lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EngineState {
    Created = 0,
    Working = 1,
    Destroyed = 2,
}

impl EngineState {
    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            0 => EngineState::Created,
            1 => EngineState::Working,
            _ => EngineState::Destroyed,
        }
    }
}

/// Errors raised by the submission engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Async runtime could not be created.
    #[error("failed to build async runtime: {0}")]
    Runtime(#[source] std::io::Error),

    /// Engine was destroyed; no further work is possible.
    #[error("job handle already destroyed")]
    Destroyed,

    /// Request is structurally invalid.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Endpoint is not a usable RPC URL.
    #[error("invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// Network collaborator refused the payload before queueing.
    #[error("rejected by network: {0}")]
    Rejected(String),

    /// Receipt queue closed unexpectedly.
    #[error("receipt queue disconnected")]
    Disconnected,

    /// Synchronous network query failed.
    #[error(transparent)]
    Network(#[from] BlockchainError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::TxReceipt;

    fn mined(success: bool) -> BroadcastOutcome {
        BroadcastOutcome::Mined(TxReceipt {
            transaction_hash: "0xfeed".to_string(),
            success,
            block_number: Some(7),
            gas_used: 21_000,
        })
    }

    #[test]
    fn test_receipt_from_success() {
        let receipt = Receipt::from_outcome("job-1".into(), Ok(mined(true)));
        assert!(receipt.success);
        assert_eq!(receipt.transaction_hash, "0xfeed");
        assert!(receipt.message.is_empty());
        assert_eq!(receipt.job_id.as_str(), "job-1");
    }

    #[test]
    fn test_receipt_from_revert() {
        let receipt = Receipt::from_outcome("job-2".into(), Ok(mined(false)));
        assert!(!receipt.success);
        assert_eq!(receipt.transaction_hash, "0xfeed");
        assert_eq!(receipt.message, "transaction reverted");
    }

    #[test]
    fn test_receipt_from_pending() {
        let outcome = BroadcastOutcome::Pending {
            tx_hash: "0xbeef".to_string(),
            reason: "timed out".to_string(),
        };
        let receipt = Receipt::from_outcome("job-3".into(), Ok(outcome));
        assert!(!receipt.success);
        assert_eq!(receipt.transaction_hash, "0xbeef");
        assert_eq!(receipt.message, "transaction pending: timed out");
    }

    #[test]
    fn test_receipt_from_network_error() {
        let receipt = Receipt::from_outcome(
            "job-4".into(),
            Err(BlockchainError::Rpc("nonce too low".to_string())),
        );
        assert!(!receipt.success);
        assert!(receipt.transaction_hash.is_empty());
        assert_eq!(receipt.message, "RPC error: nonce too low");
    }

    #[test]
    fn test_receipt_json_shape() {
        let receipt = Receipt::from_outcome("job-5".into(), Ok(mined(true)));
        let json = serde_json::to_value(&receipt).unwrap();
        assert_eq!(json["job_id"], "job-5");
        assert_eq!(json["success"], true);
    }

    #[test]
    fn test_state_round_trip() {
        for state in [EngineState::Created, EngineState::Working, EngineState::Destroyed] {
            assert_eq!(EngineState::from_u8(state as u8), state);
        }
    }
}

//! Chain-facing types and error definitions.

use thiserror::Error;

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Endpoint is not a usable RPC URL.
    #[error("Invalid RPC endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// Raw payload is not a signed transaction the node can accept.
    #[error("Invalid transaction payload: {0}")]
    InvalidPayload(String),

    /// Invalid private key format or signing error.
    #[error("Wallet error: {0}")]
    Wallet(String),
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// Receipt fields extracted from a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    /// Transaction hash, 0x-prefixed hex.
    pub transaction_hash: String,
    /// Execution status reported by the node.
    pub success: bool,
    /// Block the transaction was included in.
    pub block_number: Option<u64>,
    /// Gas consumed by the transaction.
    pub gas_used: u64,
}

/// What the node reported for a broadcast transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BroadcastOutcome {
    /// Transaction was mined and a receipt is available.
    Mined(TxReceipt),
    /// Node accepted the transaction but no receipt arrived in time.
    Pending { tx_hash: String, reason: String },
}

impl BroadcastOutcome {
    /// Hash of the broadcast transaction.
    pub fn tx_hash(&self) -> &str {
        match self {
            BroadcastOutcome::Mined(receipt) => &receipt.transaction_hash,
            BroadcastOutcome::Pending { tx_hash, .. } => tx_hash,
        }
    }
}

/// Validate that an endpoint is an http(s) URL.
pub fn parse_endpoint(endpoint: &str) -> BlockchainResult<url::Url> {
    let url = url::Url::parse(endpoint).map_err(|e| BlockchainError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(BlockchainError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BlockchainError::Timeout(10);
        assert_eq!(err.to_string(), "RPC timeout after 10 seconds");

        let err = BlockchainError::InvalidPayload("empty".to_string());
        assert_eq!(err.to_string(), "Invalid transaction payload: empty");
    }

    #[test]
    fn test_parse_endpoint() {
        assert!(parse_endpoint("http://localhost:8545").is_ok());
        assert!(parse_endpoint("https://evm.example.org/rpc").is_ok());

        let err = parse_endpoint("ws://localhost:8546").unwrap_err();
        assert!(err.to_string().contains("unsupported scheme 'ws'"));

        let err = parse_endpoint("localhost").unwrap_err();
        assert!(matches!(err, BlockchainError::InvalidEndpoint { .. }));
    }

    #[test]
    fn test_outcome_hash() {
        let pending = BroadcastOutcome::Pending {
            tx_hash: "0xabc".to_string(),
            reason: "timeout".to_string(),
        };
        assert_eq!(pending.tx_hash(), "0xabc");
    }
}

//! Blockchain collaborators.
//!
//! # Data Flow
//! ```text
//! Environment Variables (private key)
//!     → wallet.rs (key loading, signing)
//!
//! Signed raw transaction (from caller)
//!     → network.rs (Network trait, what the engine depends on)
//!     → rpc.rs (alloy JSON-RPC implementation with timeouts)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts

pub mod network;
pub mod rpc;
pub mod types;
pub mod wallet;

pub use network::Network;
pub use rpc::RpcNetwork;
pub use types::{BlockchainError, BlockchainResult, BroadcastOutcome, TxReceipt};
pub use wallet::Wallet;

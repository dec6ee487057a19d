//! Asynchronous transaction relay.
//!
//! Submits pre-signed transactions to JSON-RPC nodes in the background and
//! reports each completion to a caller-supplied callback, exactly once per
//! accepted job.

pub mod blockchain;
pub mod client;
pub mod config;
pub mod engine;
pub mod lifecycle;
pub mod observability;

pub use client::{ClientError, RelayClient};
pub use config::RelayConfig;
pub use engine::{JobId, Receipt};

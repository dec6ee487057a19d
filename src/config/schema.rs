//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the transaction relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Submission engine settings (runtime size, poll pacing).
    pub engine: EngineConfig,

    /// Network collaborator settings (RPC endpoint, timeouts).
    pub network: NetworkConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Submission engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of tokio worker threads driving in-flight broadcasts.
    pub worker_threads: usize,

    /// Upper bound on a single blocking poll, in milliseconds.
    ///
    /// Stop and destroy requests are observed within one interval.
    pub poll_interval_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            worker_threads: 2,
            poll_interval_ms: 1000,
        }
    }
}

/// Network collaborator configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// JSON-RPC endpoint used when a caller does not supply one.
    pub default_endpoint: String,

    /// Chain ID (e.g., 1 for Ethereum mainnet, 31337 for local Anvil).
    pub chain_id: u64,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// How long to wait for a receipt after the node accepted a transaction.
    pub receipt_timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            default_endpoint: "http://localhost:8545".to_string(),
            chain_id: 31337,
            rpc_timeout_secs: 10,
            receipt_timeout_secs: 60,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RelayConfig::default();
        assert_eq!(config.engine.poll_interval_ms, 1000);
        assert_eq!(config.engine.worker_threads, 2);
        assert_eq!(config.network.rpc_timeout_secs, 10);
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: RelayConfig = toml::from_str(
            r#"
            [engine]
            poll_interval_ms = 250

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.engine.poll_interval_ms, 250);
        assert_eq!(config.engine.worker_threads, 2);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.network.default_endpoint, "http://localhost:8545");
    }
}

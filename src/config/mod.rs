//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RelayConfig (validated, immutable)
//!     → handed to the client facade at construction
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; a new client picks up changes
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::EngineConfig;
pub use schema::LogFormat;
pub use schema::NetworkConfig;
pub use schema::ObservabilityConfig;
pub use schema::RelayConfig;

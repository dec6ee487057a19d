//! Client facade subsystem.
//!
//! # Data Flow
//! ```text
//! caller thread(s)                     worker thread
//! ─────────────────                    ─────────────
//! RelayClient::broadcast ──▶ engine ──▶ worker::RunGuard::run
//!                                           │ poll_next_blocking
//!                                           ▼
//!                                      CallbackSink::deliver
//! ```
//!
//! # State Machine
//! ```text
//! constructed ──run()/start()──▶ working ──destroy()──▶ destroyed
//!      └────────────────────destroy()────────────────────────┘
//! ```
//!
//! # Design Decisions
//! - The job handle lives in an atomically swappable slot instead of being
//!   passed around as a raw pointer; destroy empties the slot exactly once
//! - The callback slot is swapped atomically, so it may be replaced while
//!   the loop runs
//! - Submit-time rejections are returned synchronously and never reach the
//!   callback

pub mod callback;
pub mod error;
pub mod facade;
mod worker;

pub use callback::CallbackSink;
pub use error::ClientError;
pub use facade::RelayClient;

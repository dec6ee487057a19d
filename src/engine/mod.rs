//! Asynchronous submission engine (the job handle).
//!
//! # Data Flow
//! ```text
//! submit(request)
//!     → validation (payload, endpoint, Network::validate)
//!     → request queue
//!     → dispatcher task ── one task per job ──▶ Network::broadcast
//!     → receipt queue (completion order)
//!     → poll_next_blocking / poll_next_nonblocking
//! ```
//!
//! # Design Decisions
//! - The engine owns its own multi-threaded tokio runtime so callers stay
//!   fully synchronous
//! - Poll results are typed: `Ready`, `NotReady`, or an `EngineError`, so
//!   "nothing yet" is never confused with "engine gone"
//! - Destroy cancels the whole queue; there is no per-job timeout

pub mod queue;
pub mod stats;
pub mod types;

pub use queue::SubmissionEngine;
pub use stats::StatsSnapshot;
pub use types::{EngineError, EngineState, JobId, PollOutcome, Receipt, SubmissionRequest};

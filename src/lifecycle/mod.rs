//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Job handle created:
//!     Shutdown::new() → dispatcher and job tasks subscribe
//!
//! Job handle destroyed:
//!     Shutdown::trigger() → dispatcher stops reading requests
//!                         → in-flight broadcasts are abandoned
//! ```
//!
//! # Design Decisions
//! - Cancellation is wholesale; there is no per-job cancel
//! - Triggering is sticky so late subscribers still observe it

pub mod shutdown;

pub use shutdown::Shutdown;

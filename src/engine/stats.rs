//! Engine counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::observability::metrics;

/// Lock-free job counters shared by the engine's tasks.
#[derive(Debug, Default)]
pub struct EngineStats {
    submitted: AtomicU64,
    rejected: AtomicU64,
    completed: AtomicU64,
    delivered: AtomicU64,
}

/// Point-in-time copy of [`EngineStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Jobs accepted into the queue.
    pub submitted: u64,
    /// Jobs refused at submit time.
    pub rejected: u64,
    /// Jobs with a receipt produced.
    pub completed: u64,
    /// Receipts handed to a poller.
    pub delivered: u64,
}

impl StatsSnapshot {
    /// Accepted jobs still waiting for the network.
    pub fn in_flight(&self) -> u64 {
        self.submitted.saturating_sub(self.completed)
    }
}

impl EngineStats {
    pub fn record_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
        metrics::record_submitted();
        metrics::record_in_flight(self.snapshot().in_flight());
    }

    pub fn record_rejected(&self, reason: &'static str) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
        metrics::record_rejected(reason);
    }

    pub fn record_completed(&self, success: bool) {
        self.completed.fetch_add(1, Ordering::Relaxed);
        metrics::record_receipt(success);
        metrics::record_in_flight(self.snapshot().in_flight());
    }

    pub fn record_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            submitted: self.submitted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
        }
    }
}

//! Callback sink invoked for every completed job.

use std::panic::{self, AssertUnwindSafe};

use crate::engine::Receipt;
use crate::observability::metrics;

/// Caller-supplied completion handler.
///
/// Receives the transaction hash, success flag, message and job ID through
/// the [`Receipt`]. State the handler needs should be captured by the
/// closure itself.
pub struct CallbackSink {
    handler: Box<dyn Fn(&Receipt) + Send + Sync>,
}

impl CallbackSink {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&Receipt) + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
        }
    }

    /// Invoke the handler. A panicking handler is contained and reported as
    /// `false` so the worker loop keeps running.
    pub fn deliver(&self, receipt: &Receipt) -> bool {
        match panic::catch_unwind(AssertUnwindSafe(|| (self.handler)(receipt))) {
            Ok(()) => true,
            Err(_) => {
                metrics::record_callback_panic();
                tracing::error!(job_id = %receipt.job_id, "Callback panicked");
                false
            }
        }
    }
}

impl std::fmt::Debug for CallbackSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackSink").finish_non_exhaustive()
    }
}

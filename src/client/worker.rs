//! Worker loop: polls the job handle and forwards receipts to the callback.
//!
//! # Loop
//! ```text
//! while not stopped and the job handle is alive:
//!     poll_next_blocking()   (bounded by the poll interval)
//!         Ready(receipt)  → callback(receipt)
//!         NotReady        → retry
//!         Destroyed       → exit
//!         other error     → exit with error
//! ```
//!
//! At most one loop runs per client, so callbacks are never concurrent.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwapOption;

use crate::client::callback::CallbackSink;
use crate::client::error::ClientError;
use crate::engine::{EngineError, PollOutcome, SubmissionEngine};

/// State shared between the facade and the thread running the loop.
pub(crate) struct Shared {
    /// The job handle. `None` once destroyed.
    pub(crate) engine: ArcSwapOption<SubmissionEngine>,
    /// Current callback; swapped atomically, read once per receipt.
    pub(crate) callback: ArcSwapOption<CallbackSink>,
    /// Set while a loop is active.
    running: AtomicBool,
    /// Asks the active loop to exit at its next iteration.
    stop: AtomicBool,
}

impl Shared {
    pub(crate) fn new(engine: SubmissionEngine) -> Self {
        Self {
            engine: ArcSwapOption::new(Some(Arc::new(engine))),
            callback: ArcSwapOption::empty(),
            running: AtomicBool::new(false),
            stop: AtomicBool::new(false),
        }
    }

    pub(crate) fn engine(&self) -> Result<Arc<SubmissionEngine>, ClientError> {
        self.engine.load_full().ok_or(ClientError::Destroyed)
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub(crate) fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    /// Reserve the right to run the loop and move the engine to working.
    pub(crate) fn claim(self: &Arc<Self>) -> Result<RunGuard, ClientError> {
        let engine = self.engine()?;

        if self.callback.load().is_none() {
            return Err(ClientError::NoCallback);
        }

        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ClientError::AlreadyRunning);
        }
        let guard = RunGuard {
            shared: self.clone(),
        };

        self.stop.store(false, Ordering::SeqCst);
        engine.start_working()?;
        Ok(guard)
    }
}

/// Proof that this thread owns the loop. Releases the claim on drop.
pub(crate) struct RunGuard {
    shared: Arc<Shared>,
}

impl RunGuard {
    /// Run the poll loop until stopped or destroyed.
    pub(crate) fn run(self) -> Result<(), ClientError> {
        let shared = &self.shared;
        tracing::info!("Worker loop started");

        let result = loop {
            if shared.stop.load(Ordering::SeqCst) {
                break Ok(());
            }

            let Some(engine) = shared.engine.load_full() else {
                break Ok(());
            };

            let polled = engine.poll_next_blocking();
            // Not holding the handle while the callback runs lets it destroy the client.
            drop(engine);

            match polled {
                Ok(PollOutcome::Ready(receipt)) => match shared.callback.load_full() {
                    Some(callback) => {
                        callback.deliver(&receipt);
                    }
                    None => {
                        tracing::warn!(job_id = %receipt.job_id, "Receipt dropped, no callback");
                    }
                },
                Ok(PollOutcome::NotReady) => continue,
                Err(EngineError::Destroyed) => break Ok(()),
                Err(e) => {
                    tracing::error!(error = %e, "Worker loop failed");
                    break Err(e.into());
                }
            }
        };

        tracing::info!("Worker loop stopped");
        result
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.shared.running.store(false, Ordering::SeqCst);
    }
}

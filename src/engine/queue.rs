//! Submission engine: the job handle behind the client facade.
//!
//! # Responsibilities
//! - Own the tokio runtime that drives broadcasts
//! - Queue submission requests and fan them out, one task per job
//! - Queue receipts in completion order for pollers
//! - Tear everything down on destroy
//!
//! # Lifecycle
//! ```text
//! Created ──start_working()──▶ Working ──destroy()──▶ Destroyed
//!    └───────────────────destroy()───────────────────────┘
//! ```
//!
//! Requests submitted while `Created` wait in the queue until the dispatcher
//! starts. `Destroyed` is terminal: every call except `destroy` returns
//! [`EngineError::Destroyed`].

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{Address, U256};
use tokio::runtime::{Builder, Runtime};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::time::timeout;

use crate::blockchain::types::parse_endpoint;
use crate::blockchain::{BlockchainError, Network};
use crate::config::EngineConfig;
use crate::engine::stats::{EngineStats, StatsSnapshot};
use crate::engine::types::{EngineError, EngineState, PollOutcome, Receipt, SubmissionRequest};
use crate::lifecycle::Shutdown;

/// Asynchronous transaction submission engine.
///
/// All methods take `&self` and are safe to call from any thread, but the
/// blocking ones (`poll_next_blocking`, `balance`) must not be called from
/// inside an async context.
pub struct SubmissionEngine {
    /// Taken out on drop so the runtime can shut down in the background.
    runtime: Option<Runtime>,
    network: Arc<dyn Network>,
    state: AtomicU8,
    requests: mpsc::UnboundedSender<SubmissionRequest>,
    /// Request receiver, handed to the dispatcher by `start_working`.
    queued: Mutex<Option<mpsc::UnboundedReceiver<SubmissionRequest>>>,
    receipt_tx: mpsc::UnboundedSender<Receipt>,
    receipts: tokio::sync::Mutex<mpsc::UnboundedReceiver<Receipt>>,
    shutdown: Arc<Shutdown>,
    stats: Arc<EngineStats>,
    poll_interval: Duration,
}

impl SubmissionEngine {
    /// Create an engine in the `Created` state.
    ///
    /// Fails only if the runtime cannot be built.
    pub fn new(config: &EngineConfig, network: Arc<dyn Network>) -> Result<Self, EngineError> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(config.worker_threads.max(1))
            .thread_name("tx-relay-engine")
            .enable_all()
            .build()
            .map_err(EngineError::Runtime)?;

        let (requests, queued) = mpsc::unbounded_channel();
        let (receipt_tx, receipts) = mpsc::unbounded_channel();

        Ok(Self {
            runtime: Some(runtime),
            network,
            state: AtomicU8::new(EngineState::Created as u8),
            requests,
            queued: Mutex::new(Some(queued)),
            receipt_tx,
            receipts: tokio::sync::Mutex::new(receipts),
            shutdown: Arc::new(Shutdown::new()),
            stats: Arc::new(EngineStats::default()),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EngineState {
        EngineState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Upper bound on a single blocking poll.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    fn runtime(&self) -> Result<&Runtime, EngineError> {
        if self.state() == EngineState::Destroyed {
            return Err(EngineError::Destroyed);
        }
        self.runtime.as_ref().ok_or(EngineError::Destroyed)
    }

    /// Start the dispatcher. Idempotent: returns `Ok(false)` if already working.
    pub fn start_working(&self) -> Result<bool, EngineError> {
        let runtime = self.runtime()?;

        let requests = {
            let mut queued = self.queued.lock().unwrap_or_else(|e| e.into_inner());
            match queued.take() {
                Some(requests) => requests,
                None => return Ok(false),
            }
        };

        if self
            .state
            .compare_exchange(
                EngineState::Created as u8,
                EngineState::Working as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_err()
        {
            return Err(EngineError::Destroyed);
        }

        runtime.spawn(dispatch(
            requests,
            self.network.clone(),
            self.receipt_tx.clone(),
            self.shutdown.clone(),
            self.stats.clone(),
        ));

        tracing::info!("Submission engine working");
        Ok(true)
    }

    /// Queue a signed transaction for broadcast. Returns without waiting for
    /// the network.
    ///
    /// An `Err` means the job never entered the queue and will never produce
    /// a receipt.
    pub fn submit(&self, request: SubmissionRequest) -> Result<(), EngineError> {
        self.runtime()?;

        if let Err(e) = self.check(&request) {
            let reason = match &e {
                EngineError::InvalidEndpoint { .. } => "endpoint",
                EngineError::Rejected(_) => "payload",
                _ => "request",
            };
            self.stats.record_rejected(reason);
            tracing::warn!(job_id = %request.job_id, error = %e, "Submission rejected");
            return Err(e);
        }

        let job_id = request.job_id.clone();
        self.requests
            .send(request)
            .map_err(|_| EngineError::Destroyed)?;
        self.stats.record_submitted();

        tracing::debug!(job_id = %job_id, "Job queued");
        Ok(())
    }

    fn check(&self, request: &SubmissionRequest) -> Result<(), EngineError> {
        if request.raw_tx.is_empty() {
            return Err(EngineError::InvalidRequest("empty payload".to_string()));
        }

        parse_endpoint(&request.endpoint).map_err(|e| match e {
            BlockchainError::InvalidEndpoint { endpoint, reason } => {
                EngineError::InvalidEndpoint { endpoint, reason }
            }
            other => EngineError::Rejected(other.to_string()),
        })?;

        self.network
            .validate(&request.raw_tx)
            .map_err(|e| EngineError::Rejected(e.to_string()))
    }

    /// Wait for the next receipt, at most one poll interval.
    ///
    /// Returns early with [`EngineError::Destroyed`] if the engine is
    /// destroyed while waiting.
    pub fn poll_next_blocking(&self) -> Result<PollOutcome, EngineError> {
        let runtime = self.runtime()?;

        let next = runtime.block_on(async {
            tokio::select! {
                _ = self.shutdown.wait() => Err(EngineError::Destroyed),
                received = timeout(self.poll_interval, async {
                    let mut receipts = self.receipts.lock().await;
                    receipts.recv().await
                }) => Ok(received),
            }
        })?;

        match next {
            Ok(Some(receipt)) => Ok(self.delivered(receipt)),
            Ok(None) => Err(EngineError::Disconnected),
            Err(_elapsed) => Ok(PollOutcome::NotReady),
        }
    }

    /// Take the next receipt if one is already waiting.
    pub fn poll_next_nonblocking(&self) -> Result<PollOutcome, EngineError> {
        self.runtime()?;

        // Another poller holds the queue; nothing for us right now.
        let Ok(mut receipts) = self.receipts.try_lock() else {
            return Ok(PollOutcome::NotReady);
        };

        match receipts.try_recv() {
            Ok(receipt) => Ok(self.delivered(receipt)),
            Err(TryRecvError::Empty) => Ok(PollOutcome::NotReady),
            Err(TryRecvError::Disconnected) => Err(EngineError::Disconnected),
        }
    }

    fn delivered(&self, receipt: Receipt) -> PollOutcome {
        self.stats.record_delivered();
        tracing::debug!(
            job_id = %receipt.job_id,
            tx_hash = %receipt.transaction_hash,
            success = receipt.success,
            "Receipt dequeued"
        );
        PollOutcome::Ready(receipt)
    }

    /// Query a native balance through the network collaborator, blocking.
    pub fn balance(&self, address: Address, endpoint: &str) -> Result<U256, EngineError> {
        let runtime = self.runtime()?;
        let balance = runtime.block_on(self.network.balance(address, endpoint))?;
        Ok(balance)
    }

    /// Job counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Move to `Destroyed` and cancel all queued and in-flight jobs.
    ///
    /// Idempotent: returns false if the engine was already destroyed.
    pub fn destroy(&self) -> bool {
        let previous = self
            .state
            .swap(EngineState::Destroyed as u8, Ordering::SeqCst);
        if EngineState::from_u8(previous) == EngineState::Destroyed {
            return false;
        }

        self.shutdown.trigger();
        let stats = self.stats.snapshot();
        tracing::info!(
            submitted = stats.submitted,
            abandoned = stats.in_flight(),
            "Submission engine destroyed"
        );
        true
    }
}

impl Drop for SubmissionEngine {
    fn drop(&mut self) {
        self.destroy();
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

impl std::fmt::Debug for SubmissionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionEngine")
            .field("state", &self.state())
            .field("poll_interval", &self.poll_interval)
            .field("stats", &self.stats.snapshot())
            .finish()
    }
}

/// Read requests until shutdown, spawning one broadcast task per job.
async fn dispatch(
    mut requests: mpsc::UnboundedReceiver<SubmissionRequest>,
    network: Arc<dyn Network>,
    receipts: mpsc::UnboundedSender<Receipt>,
    shutdown: Arc<Shutdown>,
    stats: Arc<EngineStats>,
) {
    loop {
        let request = tokio::select! {
            _ = shutdown.wait() => break,
            request = requests.recv() => match request {
                Some(request) => request,
                None => break,
            },
        };

        tokio::spawn(broadcast_job(
            request,
            network.clone(),
            receipts.clone(),
            shutdown.clone(),
            stats.clone(),
        ));
    }

    tracing::debug!("Dispatcher stopped");
}

async fn broadcast_job(
    request: SubmissionRequest,
    network: Arc<dyn Network>,
    receipts: mpsc::UnboundedSender<Receipt>,
    shutdown: Arc<Shutdown>,
    stats: Arc<EngineStats>,
) {
    let SubmissionRequest {
        raw_tx,
        endpoint,
        job_id,
    } = request;

    tracing::debug!(job_id = %job_id, endpoint = %endpoint, "Broadcasting");

    let outcome = tokio::select! {
        _ = shutdown.wait() => {
            tracing::debug!(job_id = %job_id, "Job abandoned on shutdown");
            return;
        }
        outcome = network.broadcast(raw_tx, &endpoint) => outcome,
    };

    if let Err(e) = &outcome {
        tracing::warn!(job_id = %job_id, endpoint = %endpoint, error = %e, "Broadcast failed");
    }

    let receipt = Receipt::from_outcome(job_id, outcome);
    stats.record_completed(receipt.success);

    if let Err(e) = receipts.send(receipt) {
        tracing::debug!(job_id = %e.0.job_id, "Receipt dropped, queue closed");
    }
}

//! The public client object.

use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use alloy::primitives::{Address, U256};

use crate::blockchain::{Network, RpcNetwork};
use crate::client::callback::CallbackSink;
use crate::client::error::ClientError;
use crate::client::worker::Shared;
use crate::config::RelayConfig;
use crate::engine::{EngineError, EngineState, JobId, Receipt, StatsSnapshot, SubmissionEngine, SubmissionRequest};

/// Asynchronous transaction relay client.
///
/// Owns exactly one job handle for its whole life. Typical use:
///
/// ```no_run
/// use tx_relay::{RelayClient, RelayConfig};
///
/// let client = RelayClient::new(RelayConfig::default())?;
/// client.set_callback(|receipt| {
///     println!("{} -> {} ({})", receipt.job_id, receipt.transaction_hash, receipt.success);
/// })?;
/// client.start()?;
/// client.broadcast(vec![0x02, 0xf8], "http://localhost:8545", "job-1")?;
/// // ...
/// client.destroy();
/// # Ok::<(), tx_relay::ClientError>(())
/// ```
///
/// # Threading
/// - `broadcast`, `set_callback`, `stop` and `destroy` may be called from any
///   thread, including while the worker loop runs.
/// - Callbacks run on the worker thread, one at a time.
/// - `set_callback` swaps atomically; the new callback applies from the next
///   receipt.
/// - `destroy` blocks until the worker thread started by `start` exits, which
///   happens promptly because destroy wakes the pending poll. A loop driven by
///   `run` on a caller-owned thread is only signalled, not joined.
pub struct RelayClient {
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
    config: RelayConfig,
}

impl RelayClient {
    /// Create a client broadcasting over JSON-RPC.
    pub fn new(config: RelayConfig) -> Result<Self, ClientError> {
        let network = Arc::new(RpcNetwork::new(config.network.clone()));
        Self::with_network(config, network)
    }

    /// Create a client with a custom network collaborator.
    pub fn with_network(config: RelayConfig, network: Arc<dyn Network>) -> Result<Self, ClientError> {
        let engine = SubmissionEngine::new(&config.engine, network).map_err(ClientError::Construct)?;

        tracing::debug!(
            poll_interval_ms = config.engine.poll_interval_ms,
            worker_threads = config.engine.worker_threads,
            "Relay client constructed"
        );

        Ok(Self {
            shared: Arc::new(Shared::new(engine)),
            worker: Mutex::new(None),
            config,
        })
    }

    /// Endpoint from configuration, for callers that do not pick one.
    pub fn default_endpoint(&self) -> &str {
        &self.config.network.default_endpoint
    }

    /// Lifecycle state of the job handle.
    pub fn state(&self) -> EngineState {
        match self.shared.engine.load_full() {
            Some(engine) => engine.state(),
            None => EngineState::Destroyed,
        }
    }

    /// Whether a worker loop is currently polling.
    pub fn is_running(&self) -> bool {
        self.shared.is_running()
    }

    /// Replace the completion callback.
    pub fn set_callback<F>(&self, callback: F) -> Result<(), ClientError>
    where
        F: Fn(&Receipt) + Send + Sync + 'static,
    {
        self.shared.engine()?;
        self.shared
            .callback
            .store(Some(Arc::new(CallbackSink::new(callback))));
        Ok(())
    }

    /// Run the worker loop on the calling thread.
    ///
    /// Does not return until `stop` or `destroy` is called from another
    /// thread (or from the callback).
    pub fn run(&self) -> Result<(), ClientError> {
        self.shared.claim()?.run()
    }

    /// Run the worker loop on a dedicated background thread.
    pub fn start(&self) -> Result<(), ClientError> {
        let mut worker = self.worker.lock().unwrap_or_else(|e| e.into_inner());

        let guard = self.shared.claim()?;
        // A finished thread from an earlier start/stop cycle.
        if let Some(previous) = worker.take() {
            let _ = previous.join();
        }

        let handle = std::thread::Builder::new()
            .name("tx-relay-worker".to_string())
            .spawn(move || {
                if let Err(e) = guard.run() {
                    tracing::error!(error = %e, "Worker thread exited with error");
                }
            })
            .map_err(ClientError::Spawn)?;

        *worker = Some(handle);
        Ok(())
    }

    /// Stop the worker loop, keeping the job handle and any queued receipts.
    ///
    /// Joins the worker thread started by `start`.
    pub fn stop(&self) {
        self.shared.request_stop();
        self.join_worker();
    }

    /// Queue a signed transaction for broadcast.
    ///
    /// `Ok` means the job was accepted and exactly one receipt will reach the
    /// callback once the network answers. `Err(Rejected)` means it was refused
    /// up front and no callback will ever fire for it.
    pub fn broadcast(
        &self,
        raw_tx: impl Into<Vec<u8>>,
        endpoint: &str,
        job_id: impl Into<JobId>,
    ) -> Result<(), ClientError> {
        let engine = self.shared.engine()?;
        let job_id = job_id.into();

        engine
            .submit(SubmissionRequest::new(raw_tx.into(), endpoint, job_id.clone()))
            .map_err(|e| match e {
                EngineError::Destroyed => ClientError::Destroyed,
                source => ClientError::Rejected { job_id, source },
            })
    }

    /// Native balance of `address` at `endpoint`, blocking.
    pub fn balance(&self, address: Address, endpoint: &str) -> Result<U256, ClientError> {
        Ok(self.shared.engine()?.balance(address, endpoint)?)
    }

    /// Job counters.
    pub fn stats(&self) -> Result<StatsSnapshot, ClientError> {
        Ok(self.shared.engine()?.stats())
    }

    /// Destroy the job handle and stop the worker loop.
    ///
    /// Idempotent: returns false if the client was already destroyed.
    pub fn destroy(&self) -> bool {
        let Some(engine) = self.shared.engine.swap(None) else {
            return false;
        };

        engine.destroy();
        self.shared.request_stop();
        self.join_worker();
        drop(engine);

        tracing::info!("Relay client destroyed");
        true
    }

    fn join_worker(&self) {
        let handle = self
            .worker
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();

        let Some(handle) = handle else {
            return;
        };

        // Called from the callback: the loop exits once the callback returns.
        if handle.thread().id() == std::thread::current().id() {
            return;
        }

        if handle.join().is_err() {
            tracing::error!("Worker thread panicked");
        }
    }
}

impl Drop for RelayClient {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl std::fmt::Debug for RelayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayClient")
            .field("state", &self.state())
            .field("running", &self.is_running())
            .field("default_endpoint", &self.config.network.default_endpoint)
            .finish()
    }
}

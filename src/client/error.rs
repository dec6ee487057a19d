//! Client facade errors.

use thiserror::Error;

use crate::engine::{EngineError, JobId};

/// Errors returned by [`RelayClient`](crate::client::RelayClient).
#[derive(Debug, Error)]
pub enum ClientError {
    /// The job handle could not be created.
    #[error("failed to create job handle: {0}")]
    Construct(#[source] EngineError),

    /// The client was destroyed; build a new one to continue.
    #[error("job handle already destroyed")]
    Destroyed,

    /// A worker loop is already polling this client.
    #[error("worker loop already running")]
    AlreadyRunning,

    /// `run`/`start` was called before `set_callback`.
    #[error("no callback registered")]
    NoCallback,

    /// The engine refused the job at submit time; no receipt will follow.
    #[error("job {job_id} rejected: {source}")]
    Rejected {
        job_id: JobId,
        #[source]
        source: EngineError,
    },

    /// The worker thread could not be spawned.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// Any other engine failure.
    #[error(transparent)]
    Engine(EngineError),
}

impl From<EngineError> for ClientError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Destroyed => ClientError::Destroyed,
            other => ClientError::Engine(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destroyed_maps_to_destroyed() {
        let err: ClientError = EngineError::Destroyed.into();
        assert!(matches!(err, ClientError::Destroyed));

        let err: ClientError = EngineError::Disconnected.into();
        assert!(matches!(err, ClientError::Engine(EngineError::Disconnected)));
    }

    #[test]
    fn test_rejected_display() {
        let err = ClientError::Rejected {
            job_id: "job-9".into(),
            source: EngineError::InvalidRequest("empty payload".to_string()),
        };
        assert_eq!(err.to_string(), "job job-9 rejected: invalid request: empty payload");
    }
}

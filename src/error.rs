//! Error types for the coordinator
//!
//! Taxonomy covers transport, worker-reported, and configuration failures.

use thiserror::Error;

/// Primary error type for coordinator operations
#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// Could not reach a worker (connect/read/write failure)
    #[error("connection to {endpoint} failed: {reason}")]
    ConnectionFailed { endpoint: String, reason: String },

    /// Worker accepted the call but reported a search failure
    #[error("worker {endpoint} reported a fault: {reason}")]
    WorkerFault { endpoint: String, reason: String },

    /// Registry has no surviving workers to route tasks to
    #[error("worker registry is empty, no destination for tasks")]
    EmptyRegistry,

    /// No result slot exists for the given job
    #[error("job {job_id} not found")]
    JobNotFound { job_id: String },

    /// Wire frame could not be encoded or decoded
    #[error("invalid wire frame: {reason}")]
    InvalidFrame { reason: String },

    /// Internal error
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl CoordinatorError {
    /// Returns true if this error is recovered locally (logged, non-fatal)
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, CoordinatorError::EmptyRegistry)
    }

    /// Returns true if this error came from the transport layer
    pub fn is_transport(&self) -> bool {
        matches!(self, CoordinatorError::ConnectionFailed { .. })
    }
}

/// Result type alias for coordinator operations
pub type Result<T> = std::result::Result<T, CoordinatorError>;

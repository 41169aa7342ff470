//! Typed errors
//!
//! Two layers of failure exist in a sort request:
//!
//! - [`SortError`] is what a caller of the sort service can observe: either the
//!   payload was rejected, or the coordinator's own logic failed.
//! - [`PeerError`] describes a failed exchange with a single worker. It never
//!   reaches the caller; the coordinator logs it and sorts that chunk locally.

use thiserror::Error;

/// Failure reported by the sort service or a worker's sort handler
#[derive(Debug, Error)]
pub enum SortError {
    /// Payload is not a list of numbers (or is missing entirely)
    #[error("Invalid data format: {0}")]
    InvalidInput(String),

    /// Unexpected failure inside partitioning, sorting or merging
    #[error("Internal failure: {0}")]
    Internal(String),
}

impl SortError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl From<tokio::task::JoinError> for SortError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(format!("sort task failed: {}", err))
    }
}

/// Failure of one coordinator-to-worker exchange
#[derive(Debug, Error)]
pub enum PeerError {
    #[error("worker {worker_id} did not answer within {timeout_ms}ms")]
    Timeout { worker_id: u32, timeout_ms: u64 },

    #[error("worker {worker_id} unreachable: {reason}")]
    Unreachable { worker_id: u32, reason: String },

    #[error("worker {worker_id} returned HTTP {status}")]
    Status { worker_id: u32, status: u16 },

    #[error("worker {worker_id} sent a malformed response: {reason}")]
    Malformed { worker_id: u32, reason: String },
}

impl PeerError {
    /// Identity of the worker this failure belongs to
    pub fn worker_id(&self) -> u32 {
        match self {
            Self::Timeout { worker_id, .. }
            | Self::Unreachable { worker_id, .. }
            | Self::Status { worker_id, .. }
            | Self::Malformed { worker_id, .. } => *worker_id,
        }
    }
}

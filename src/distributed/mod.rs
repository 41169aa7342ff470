//! Distributed sort implementation
//!
//! This module implements sorting across a coordinator and a set of workers.
//!
//! # Architecture
//!
//! - **Coordinator**: Decides local vs distributed, partitions, dispatches, merges
//! - **Worker**: Sorts one chunk locally and reports liveness
//! - **Registry**: Static roster filtered by a liveness probe on every request
//!
//! # Modules
//!
//! - `protocol`: JSON request/response bodies and endpoint paths
//! - `registry`: Worker roster and the `LivenessProbe` capability
//! - `dispatch`: Partitioning and the `ChunkDispatcher` capability
//! - `coordinator`: The coordinator's sort path
//! - `worker`: Worker request handlers
//! - `transport`: HTTP implementation of both capabilities
//! - `mock`: In-memory implementation of both capabilities for tests

pub mod coordinator;
pub mod dispatch;
pub mod mock;
pub mod protocol;
pub mod registry;
pub mod transport;
pub mod worker;

// Re-export key types
pub use coordinator::{Coordinator, SortOutcome};
pub use dispatch::{ChunkDispatcher, ChunkOrigin, Partition, PartitionResult};
pub use protocol::{
    ErrorResponse,
    HealthResponse,
    Role,
    SortRequest,
    SortResponse,
    WorkerSortResponse,
};
pub use registry::{LivenessProbe, PeerRegistry};
pub use transport::HttpPeerClient;
pub use worker::WorkerService;

use crate::error::SortError;
use crate::merge::local_sort;
use crate::sequence::Number;

/// Run the local merge sort on the blocking pool
pub(crate) async fn local_sort_blocking(seq: Vec<Number>) -> Result<Vec<Number>, SortError> {
    Ok(tokio::task::spawn_blocking(move || local_sort(seq)).await?)
}

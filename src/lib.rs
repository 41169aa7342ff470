//! distsort - Distributed merge sort service
//!
//! distsort sorts numeric sequences over HTTP. A coordinator either sorts a request
//! locally or splits it into contiguous chunks, hands each chunk to a live worker
//! service, and merges the sorted chunks back together.
//!
//! # Architecture
//!
//! - **Merge engine**: two-way merge, recursive merge sort, k-way merge of sorted runs
//! - **Worker service**: stateless "sort this chunk" and "are you alive" handlers
//! - **Peer registry**: static worker roster filtered by a per-request liveness probe
//! - **Coordinator**: local-vs-distributed policy, partitioning, dispatch with per-chunk fallback
//! - **Sort service**: payload validation in front of the coordinator
//! - **API**: axum routers exposing `/sort` and `/health` for both roles

pub mod api;
pub mod client;
pub mod config;
pub mod distributed;
pub mod error;
pub mod merge;
pub mod sequence;
pub mod service;

// Re-export commonly used types
pub use config::Config;
pub use distributed::{Coordinator, SortOutcome, WorkerService};
pub use error::{PeerError, SortError};
pub use sequence::Number;
pub use service::SortService;

/// Result type used throughout distsort
pub type Result<T> = anyhow::Result<T>;

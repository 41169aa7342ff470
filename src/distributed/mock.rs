//! Mock worker cluster for testing
//!
//! This module provides an in-memory implementation of both peer capabilities,
//! [`LivenessProbe`] and [`ChunkDispatcher`], so the coordinator can be tested
//! without binding sockets.
//!
//! # Features
//!
//! - Mark workers as down (probe fails) or failing (dispatch fails)
//! - Delay probes or dispatches per worker to exercise timeouts
//! - Return a truncated chunk to exercise reply verification
//! - Records every probe and dispatch for later assertions
//!
//! # Example
//!
//! ```
//! use distsort::distributed::mock::MockCluster;
//! use distsort::distributed::Coordinator;
//! use distsort::config::{DispatchConfig, WorkerDescriptor};
//! use distsort::Number;
//! use std::sync::Arc;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let cluster = MockCluster::new();
//! cluster.set_failing(3);
//!
//! let peers = Arc::new(cluster.clone());
//! let roster = vec![
//!     WorkerDescriptor::new(2, "localhost", 5002),
//!     WorkerDescriptor::new(3, "localhost", 5003),
//! ];
//! let coordinator = Coordinator::new(1, DispatchConfig::default(), roster, peers.clone(), peers);
//!
//! let input: Vec<Number> = (0..100).rev().map(Number::Int).collect();
//! let outcome = coordinator.sort(input).await.unwrap();
//! assert!(outcome.distributed);
//! assert_eq!(outcome.sorted[0], Number::Int(0));
//! # });
//! ```

use super::dispatch::ChunkDispatcher;
use super::registry::LivenessProbe;
use crate::config::WorkerDescriptor;
use crate::error::PeerError;
use crate::merge::local_sort;
use crate::sequence::Number;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory stand-in for a set of workers
///
/// Clones share state, so a test can keep one handle for configuration and
/// assertions while the coordinator owns another.
#[derive(Clone, Default)]
pub struct MockCluster {
    state: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    /// Workers whose probe answers "not alive"
    down: HashSet<u32>,
    /// Workers whose dispatch returns an error
    failing: HashSet<u32>,
    /// Workers that drop the last element of every chunk
    truncating: HashSet<u32>,
    probe_delays: HashMap<u32, Duration>,
    dispatch_delays: HashMap<u32, Duration>,
    probe_count: usize,
    /// (worker id, chunk length) per successful dispatch
    dispatched: Vec<(u32, usize)>,
}

impl MockCluster {
    /// Create a cluster where every worker is alive and healthy
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a worker fail its liveness probe
    pub fn set_down(&self, worker_id: u32) {
        self.state.lock().unwrap().down.insert(worker_id);
    }

    /// Make a worker pass probes but fail every dispatch
    pub fn set_failing(&self, worker_id: u32) {
        self.state.lock().unwrap().failing.insert(worker_id);
    }

    /// Make a worker return one element fewer than it was sent
    pub fn set_truncating(&self, worker_id: u32) {
        self.state.lock().unwrap().truncating.insert(worker_id);
    }

    pub fn set_probe_delay(&self, worker_id: u32, delay: Duration) {
        self.state.lock().unwrap().probe_delays.insert(worker_id, delay);
    }

    pub fn set_dispatch_delay(&self, worker_id: u32, delay: Duration) {
        self.state.lock().unwrap().dispatch_delays.insert(worker_id, delay);
    }

    /// Number of probes issued so far
    pub fn probe_count(&self) -> usize {
        self.state.lock().unwrap().probe_count
    }

    /// Dispatches that reached a worker, as (worker id, chunk length)
    pub fn dispatched(&self) -> Vec<(u32, usize)> {
        self.state.lock().unwrap().dispatched.clone()
    }
}

#[async_trait]
impl LivenessProbe for MockCluster {
    async fn is_alive(&self, worker: &WorkerDescriptor) -> bool {
        let (delay, alive) = {
            let mut state = self.state.lock().unwrap();
            state.probe_count += 1;
            (
                state.probe_delays.get(&worker.id).copied(),
                !state.down.contains(&worker.id),
            )
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        alive
    }
}

#[async_trait]
impl ChunkDispatcher for MockCluster {
    async fn sort_chunk(
        &self,
        worker: &WorkerDescriptor,
        chunk: &[Number],
    ) -> Result<Vec<Number>, PeerError> {
        let (delay, failing, truncating) = {
            let state = self.state.lock().unwrap();
            (
                state.dispatch_delays.get(&worker.id).copied(),
                state.failing.contains(&worker.id),
                state.truncating.contains(&worker.id),
            )
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if failing {
            return Err(PeerError::Unreachable {
                worker_id: worker.id,
                reason: "mock worker configured to fail".to_string(),
            });
        }

        self.state
            .lock()
            .unwrap()
            .dispatched
            .push((worker.id, chunk.len()));

        let mut sorted = local_sort(chunk.to_vec());
        if truncating {
            sorted.pop();
        }

        Ok(sorted)
    }
}

//! Distributed coordinator
//!
//! This module implements the coordinator's sort path.
//! For each request the coordinator:
//! - Sorts locally if the input is small
//! - Probes the roster for active workers
//! - Splits the input into one contiguous chunk per active worker
//! - Dispatches the chunks concurrently, falling back to a local sort per chunk
//! - Merges the sorted chunks in their original order
//!
//! Nothing survives a request: the active set, partitions and results are
//! rebuilt every time.
//!
//! Global stability is not guaranteed. Equal values keep their relative order
//! within a chunk, and chunks are merged in input order, but a worker is free
//! to reorder equal values inside the chunk it was given.

use crate::config::{Config, DispatchConfig, WorkerDescriptor};
use crate::distributed::dispatch::{
    partition, verify_reply, ChunkDispatcher, ChunkOrigin, Partition, PartitionResult,
};
use crate::distributed::local_sort_blocking;
use crate::distributed::registry::{LivenessProbe, PeerRegistry};
use crate::error::{PeerError, SortError};
use crate::merge::merge_all;
use crate::sequence::Number;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Result of one sort request
#[derive(Debug, Clone)]
pub struct SortOutcome {
    pub sorted: Vec<Number>,
    pub elapsed: Duration,
    /// Identity of the coordinator that answered
    pub server_id: u32,
    /// Whether distribution was attempted (some chunks may still have fallen back)
    pub distributed: bool,
}

/// Distributed sort coordinator
///
/// Owns its roster and settings; holds no state between requests.
pub struct Coordinator {
    identity: u32,
    settings: DispatchConfig,
    registry: PeerRegistry,
    dispatcher: Arc<dyn ChunkDispatcher>,
}

impl Coordinator {
    /// Create a coordinator from explicit parts
    pub fn new(
        identity: u32,
        settings: DispatchConfig,
        roster: Vec<WorkerDescriptor>,
        probe: Arc<dyn LivenessProbe>,
        dispatcher: Arc<dyn ChunkDispatcher>,
    ) -> Self {
        let registry = PeerRegistry::new(roster, probe, &settings);

        Self {
            identity,
            settings,
            registry,
            dispatcher,
        }
    }

    /// Create a coordinator whose probe and dispatch share one peer client
    pub fn from_config<P>(config: &Config, peers: Arc<P>) -> Self
    where
        P: LivenessProbe + ChunkDispatcher + 'static,
    {
        Self::new(
            config.server.id,
            config.dispatch.clone(),
            config.workers.clone(),
            peers.clone(),
            peers,
        )
    }

    pub fn identity(&self) -> u32 {
        self.identity
    }

    /// Ids of the workers that currently answer a probe
    pub async fn active_worker_ids(&self) -> Vec<u32> {
        self.registry
            .active_workers()
            .await
            .iter()
            .map(|w| w.id)
            .collect()
    }

    /// Sort a sequence, distributing it when worthwhile
    ///
    /// Worker failures never surface here; only failures of the coordinator's
    /// own sorting and merging do.
    pub async fn sort(&self, seq: Vec<Number>) -> Result<SortOutcome, SortError> {
        let start = Instant::now();
        let expected_len = seq.len();

        let (sorted, distributed) = self.sort_with_policy(seq).await?;

        if sorted.len() != expected_len {
            return Err(SortError::internal(format!(
                "merge produced {} elements, expected {}",
                sorted.len(),
                expected_len
            )));
        }

        let elapsed = start.elapsed();
        info!(
            items = expected_len,
            distributed,
            elapsed_secs = elapsed.as_secs_f64(),
            "Sorting completed"
        );

        Ok(SortOutcome {
            sorted,
            elapsed,
            server_id: self.identity,
            distributed,
        })
    }

    /// Apply the local-vs-distributed policy; returns the ordering and whether it was distributed
    async fn sort_with_policy(&self, seq: Vec<Number>) -> Result<(Vec<Number>, bool), SortError> {
        if seq.len() < self.settings.small_threshold {
            info!(items = seq.len(), "Small list, sorting locally");
            return Ok((local_sort_blocking(seq).await?, false));
        }

        let active = self.registry.active_workers().await;
        if active.is_empty() {
            warn!("No active worker servers found. Sorting locally.");
            return Ok((local_sort_blocking(seq).await?, false));
        }

        let chunk_size = seq.len() / active.len();
        if chunk_size < self.settings.min_chunk {
            info!(
                chunk_size,
                min_chunk = self.settings.min_chunk,
                "Data too small for distribution, sorting locally"
            );
            return Ok((local_sort_blocking(seq).await?, false));
        }

        let partitions = partition(seq, active.len());
        info!(
            chunks = partitions.len(),
            chunk_size,
            "Distributing sort across worker servers"
        );

        let results = self.dispatch_all(partitions, &active).await?;

        let fallbacks = results.iter().filter(|r| r.is_fallback()).count();
        if fallbacks > 0 {
            warn!(fallbacks, chunks = results.len(), "Some chunks were sorted locally");
        }

        let runs: Vec<Vec<Number>> = results.into_iter().map(|r| r.sorted).collect();
        let merged = tokio::task::spawn_blocking(move || merge_all(runs)).await?;

        Ok((merged, true))
    }

    /// Send every partition to its worker; results come back in partition order
    async fn dispatch_all(
        &self,
        partitions: Vec<Partition>,
        active: &[WorkerDescriptor],
    ) -> Result<Vec<PartitionResult>, SortError> {
        let calls: Vec<_> = partitions
            .into_iter()
            .map(|p| {
                let worker = &active[p.index % active.len()];
                self.dispatch_partition(p, worker)
            })
            .collect();

        let results: Vec<Result<PartitionResult, SortError>> = stream::iter(calls)
            .buffered(self.settings.max_in_flight.max(1))
            .collect()
            .await;

        results.into_iter().collect()
    }

    /// Sort one partition remotely, or locally if the worker fails
    async fn dispatch_partition(
        &self,
        partition: Partition,
        worker: &WorkerDescriptor,
    ) -> Result<PartitionResult, SortError> {
        debug!(
            worker_id = worker.id,
            chunk = partition.index,
            items = partition.data.len(),
            "Sending chunk to worker"
        );

        let timeout = self.settings.dispatch_timeout();
        let reply = match tokio::time::timeout(timeout, self.dispatcher.sort_chunk(worker, &partition.data)).await {
            Ok(reply) => reply,
            Err(_) => Err(PeerError::Timeout {
                worker_id: worker.id,
                timeout_ms: timeout.as_millis() as u64,
            }),
        };

        let reply = reply.and_then(|sorted| {
            verify_reply(worker, &partition.data, &sorted)?;
            Ok(sorted)
        });

        match reply {
            Ok(sorted) => {
                debug!(worker_id = worker.id, chunk = partition.index, "Received sorted chunk from worker");
                Ok(PartitionResult {
                    index: partition.index,
                    sorted,
                    origin: ChunkOrigin::Remote { worker_id: worker.id },
                })
            }
            Err(err) => {
                warn!(
                    worker_id = err.worker_id(),
                    chunk = partition.index,
                    error = %err,
                    "Worker failed, sorting chunk locally"
                );
                Ok(PartitionResult {
                    index: partition.index,
                    sorted: local_sort_blocking(partition.data).await?,
                    origin: ChunkOrigin::LocalFallback,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributed::mock::MockCluster;
    use crate::merge::local_sort;
    use crate::sequence::is_sorted;
    use rand::Rng;

    fn roster(ids: &[u32]) -> Vec<WorkerDescriptor> {
        ids.iter()
            .map(|&id| WorkerDescriptor::new(id, "localhost", 5000 + id as u16))
            .collect()
    }

    fn settings() -> DispatchConfig {
        DispatchConfig {
            probe_timeout_ms: 200,
            dispatch_timeout_ms: 200,
            ..DispatchConfig::default()
        }
    }

    fn coordinator(cluster: &MockCluster, ids: &[u32]) -> Coordinator {
        let peers = Arc::new(cluster.clone());
        Coordinator::new(1, settings(), roster(ids), peers.clone(), peers)
    }

    fn random_input(len: usize) -> Vec<Number> {
        let mut rng = rand::thread_rng();
        (0..len).map(|_| Number::Int(rng.gen_range(1..=1000))).collect()
    }

    fn expected(input: &[Number]) -> Vec<Number> {
        let mut v = input.to_vec();
        v.sort();
        v
    }

    #[tokio::test]
    async fn test_trivial_inputs() {
        let cluster = MockCluster::new();
        let coord = coordinator(&cluster, &[2, 3]);

        let empty = coord.sort(vec![]).await.unwrap();
        assert!(empty.sorted.is_empty());
        assert!(!empty.distributed);

        let single = coord.sort(vec![Number::Int(9)]).await.unwrap();
        assert_eq!(single.sorted, vec![Number::Int(9)]);
        assert_eq!(cluster.probe_count(), 0);
    }

    #[tokio::test]
    async fn test_below_threshold_never_probes() {
        let cluster = MockCluster::new();
        let coord = coordinator(&cluster, &[2, 3, 4, 5]);

        let input = random_input(49);
        let outcome = coord.sort(input.clone()).await.unwrap();

        assert!(!outcome.distributed);
        assert_eq!(outcome.sorted, expected(&input));
        assert_eq!(cluster.probe_count(), 0);
        assert!(cluster.dispatched().is_empty());
    }

    #[tokio::test]
    async fn test_at_threshold_distributes() {
        let cluster = MockCluster::new();
        let coord = coordinator(&cluster, &[2, 3, 4, 5]);

        // 50 / 4 = 12 >= 10
        let input = random_input(50);
        let outcome = coord.sort(input.clone()).await.unwrap();

        assert!(outcome.distributed);
        assert_eq!(outcome.sorted, expected(&input));
        assert_eq!(cluster.probe_count(), 4);

        let dispatched = cluster.dispatched();
        assert_eq!(dispatched.len(), 4);
        assert_eq!(dispatched.iter().map(|(_, len)| len).sum::<usize>(), 50);
    }

    #[tokio::test]
    async fn test_no_active_workers_sorts_locally() {
        let cluster = MockCluster::new();
        for id in [2, 3, 4, 5] {
            cluster.set_down(id);
        }
        let coord = coordinator(&cluster, &[2, 3, 4, 5]);

        let input = random_input(200);
        let outcome = coord.sort(input.clone()).await.unwrap();

        assert!(!outcome.distributed);
        assert_eq!(outcome.sorted, local_sort(input));
        assert!(cluster.dispatched().is_empty());
    }

    #[tokio::test]
    async fn test_small_chunks_sort_locally() {
        let cluster = MockCluster::new();
        let ids: Vec<u32> = (2..=7).collect();
        let coord = coordinator(&cluster, &ids);

        // 55 / 6 = 9 < 10
        let input = random_input(55);
        let outcome = coord.sort(input.clone()).await.unwrap();

        assert!(!outcome.distributed);
        assert_eq!(outcome.sorted, expected(&input));
        assert_eq!(cluster.probe_count(), 6);
        assert!(cluster.dispatched().is_empty());
    }

    #[tokio::test]
    async fn test_one_failing_worker_is_contained() {
        let cluster = MockCluster::new();
        cluster.set_failing(3);
        let coord = coordinator(&cluster, &[2, 3, 4, 5]);

        let input = random_input(300);
        let outcome = coord.sort(input.clone()).await.unwrap();

        assert!(outcome.distributed);
        assert_eq!(outcome.sorted, expected(&input));
    }

    #[tokio::test]
    async fn test_slow_worker_times_out_and_falls_back() {
        let cluster = MockCluster::new();
        cluster.set_dispatch_delay(4, Duration::from_secs(5));
        let coord = coordinator(&cluster, &[2, 4]);

        let input = random_input(120);
        let started = Instant::now();
        let outcome = coord.sort(input.clone()).await.unwrap();

        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(outcome.distributed);
        assert_eq!(outcome.sorted, expected(&input));
    }

    #[tokio::test]
    async fn test_malformed_reply_falls_back() {
        let cluster = MockCluster::new();
        cluster.set_truncating(2);
        let coord = coordinator(&cluster, &[2, 3]);

        let input = random_input(100);
        let outcome = coord.sort(input.clone()).await.unwrap();

        assert_eq!(outcome.sorted.len(), 100);
        assert_eq!(outcome.sorted, expected(&input));
    }

    #[tokio::test]
    async fn test_end_to_end_four_workers() {
        let cluster = MockCluster::new();
        let coord = coordinator(&cluster, &[2, 3, 4, 5]);

        let mut input = vec![5, 3, 8, 1, 9, 2]
            .into_iter()
            .map(Number::Int)
            .collect::<Vec<_>>();
        input.extend(random_input(294));

        let outcome = coord.sort(input.clone()).await.unwrap();

        assert!(outcome.distributed);
        assert_eq!(outcome.server_id, 1);
        assert_eq!(outcome.sorted.len(), 300);
        assert!(is_sorted(&outcome.sorted));
        assert_eq!(outcome.sorted, expected(&input));

        // Chunk i goes to active[i]
        let mut workers: Vec<u32> = cluster.dispatched().iter().map(|(id, _)| *id).collect();
        workers.sort();
        assert_eq!(workers, vec![2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_sequential_mode_matches_concurrent() {
        let cluster = MockCluster::new();
        let peers = Arc::new(cluster.clone());
        let sequential = DispatchConfig {
            max_in_flight: 1,
            ..settings()
        };
        let coord = Coordinator::new(1, sequential, roster(&[2, 3, 4]), peers.clone(), peers);

        let input = random_input(150);
        let outcome = coord.sort(input.clone()).await.unwrap();

        assert!(outcome.distributed);
        assert_eq!(outcome.sorted, expected(&input));
    }

    #[tokio::test]
    async fn test_already_sorted_is_unchanged() {
        let cluster = MockCluster::new();
        let coord = coordinator(&cluster, &[2, 3]);

        let input: Vec<Number> = (0..100).map(Number::Int).collect();
        assert_eq!(coord.sort(input.clone()).await.unwrap().sorted, input);

        let reversed: Vec<Number> = (0..100).rev().map(Number::Int).collect();
        assert_eq!(coord.sort(reversed).await.unwrap().sorted, input);

        let equal = vec![Number::Int(7); 80];
        assert_eq!(coord.sort(equal.clone()).await.unwrap().sorted, equal);
    }

    #[tokio::test]
    async fn test_active_worker_ids() {
        let cluster = MockCluster::new();
        cluster.set_down(4);
        let coord = coordinator(&cluster, &[2, 3, 4, 5]);

        assert_eq!(coord.active_worker_ids().await, vec![2, 3, 5]);
    }
}

//! Peer registry
//!
//! The coordinator knows a fixed roster of workers. Before distributing a
//! request it asks every roster entry whether it is alive and keeps the ones
//! that answer. The active set is recomputed for each request and never cached.
//!
//! Probes run concurrently, at most `max_in_flight` at a time, and the result
//! keeps roster order no matter which probe finishes first.

use crate::config::{DispatchConfig, WorkerDescriptor};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Capability: check whether a worker is alive
///
/// Implementations must not fail; any error means "not alive". The registry
/// bounds every call with the configured probe timeout.
#[async_trait]
pub trait LivenessProbe: Send + Sync {
    async fn is_alive(&self, worker: &WorkerDescriptor) -> bool;
}

/// Static worker roster plus the probe used to filter it
pub struct PeerRegistry {
    roster: Vec<WorkerDescriptor>,
    probe: Arc<dyn LivenessProbe>,
    probe_timeout: Duration,
    max_in_flight: usize,
}

impl PeerRegistry {
    pub fn new(
        roster: Vec<WorkerDescriptor>,
        probe: Arc<dyn LivenessProbe>,
        settings: &DispatchConfig,
    ) -> Self {
        Self {
            roster,
            probe,
            probe_timeout: settings.probe_timeout(),
            max_in_flight: settings.max_in_flight.max(1),
        }
    }

    /// Probe one worker with a bounded wait
    pub async fn probe_liveness(&self, worker: &WorkerDescriptor) -> bool {
        match tokio::time::timeout(self.probe_timeout, self.probe.is_alive(worker)).await {
            Ok(alive) => alive,
            Err(_) => {
                debug!(
                    %worker,
                    timeout_ms = self.probe_timeout.as_millis() as u64,
                    "Liveness probe timed out"
                );
                false
            }
        }
    }

    /// Workers that answered a probe just now, in roster order
    pub async fn active_workers(&self) -> Vec<WorkerDescriptor> {
        let probes: Vec<_> = self
            .roster
            .iter()
            .map(|worker| async move { (worker, self.probe_liveness(worker).await) })
            .collect();

        let results: Vec<(&WorkerDescriptor, bool)> = stream::iter(probes)
            .buffered(self.max_in_flight)
            .collect()
            .await;

        results
            .into_iter()
            .filter_map(|(worker, alive)| {
                if alive {
                    info!(%worker, "Worker server is active");
                    Some(worker.clone())
                } else {
                    info!(%worker, "Worker server is not responding");
                    None
                }
            })
            .collect()
    }
}

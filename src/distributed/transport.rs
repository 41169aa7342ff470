//! HTTP peer client
//!
//! Implements the two peer capabilities against real workers:
//!
//! - [`LivenessProbe`]: `GET /health`, alive iff the status is 2xx
//! - [`ChunkDispatcher`]: `POST /sort` with `{ "data": chunk }`

use crate::config::{DispatchConfig, WorkerDescriptor};
use crate::distributed::dispatch::ChunkDispatcher;
use crate::distributed::protocol::{endpoints, WorkerSortResponse};
use crate::distributed::registry::LivenessProbe;
use crate::error::PeerError;
use crate::sequence::Number;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Borrowed request body, so chunks are serialized without copying
#[derive(Serialize)]
struct ChunkBody<'a> {
    data: &'a [Number],
}

/// reqwest-backed client for talking to workers
#[derive(Debug, Clone)]
pub struct HttpPeerClient {
    client: reqwest::Client,
    probe_timeout: Duration,
    dispatch_timeout: Duration,
}

impl HttpPeerClient {
    /// Create a client using the probe and dispatch budgets from `settings`
    pub fn new(settings: &DispatchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.probe_timeout())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            probe_timeout: settings.probe_timeout(),
            dispatch_timeout: settings.dispatch_timeout(),
        })
    }

    fn url(worker: &WorkerDescriptor, path: &str) -> String {
        format!("{}{}", worker.base_url(), path)
    }

    fn classify(&self, worker: &WorkerDescriptor, err: reqwest::Error) -> PeerError {
        if err.is_timeout() {
            PeerError::Timeout {
                worker_id: worker.id,
                timeout_ms: self.dispatch_timeout.as_millis() as u64,
            }
        } else if err.is_decode() {
            PeerError::Malformed {
                worker_id: worker.id,
                reason: err.to_string(),
            }
        } else {
            PeerError::Unreachable {
                worker_id: worker.id,
                reason: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl LivenessProbe for HttpPeerClient {
    async fn is_alive(&self, worker: &WorkerDescriptor) -> bool {
        let response = self
            .client
            .get(Self::url(worker, endpoints::HEALTH))
            .timeout(self.probe_timeout)
            .send()
            .await;

        match response {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(worker_id = worker.id, error = %e, "Health check failed");
                false
            }
        }
    }
}

#[async_trait]
impl ChunkDispatcher for HttpPeerClient {
    async fn sort_chunk(
        &self,
        worker: &WorkerDescriptor,
        chunk: &[Number],
    ) -> Result<Vec<Number>, PeerError> {
        let response = self
            .client
            .post(Self::url(worker, endpoints::SORT))
            .timeout(self.dispatch_timeout)
            .json(&ChunkBody { data: chunk })
            .send()
            .await
            .map_err(|e| self.classify(worker, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PeerError::Status {
                worker_id: worker.id,
                status: status.as_u16(),
            });
        }

        let body: WorkerSortResponse = response
            .json()
            .await
            .map_err(|e| self.classify(worker, e))?;

        Ok(body.sorted_data)
    }
}

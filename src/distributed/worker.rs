//! Worker service
//!
//! A worker sorts whatever chunk it is sent, all of it, with the local merge
//! sort. It never partitions further and keeps no state between requests.

use crate::config::Config;
use crate::distributed::local_sort_blocking;
use crate::distributed::protocol::{HealthResponse, Role, WorkerSortResponse};
use crate::error::SortError;
use crate::sequence::parse_sort_payload;
use anyhow::Result;
use serde_json::Value;
use std::time::Instant;
use tracing::info;

/// Stateless sort worker
#[derive(Debug, Clone)]
pub struct WorkerService {
    identity: u32,
    host: String,
    port: u16,
}

impl WorkerService {
    pub fn new(identity: u32, host: impl Into<String>, port: u16) -> Self {
        Self {
            identity,
            host: host.into(),
            port,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            config.server.id,
            config.server.host.clone(),
            config.server.listen_port()?,
        ))
    }

    pub fn identity(&self) -> u32 {
        self.identity
    }

    /// Sort the `data` list of a request payload
    pub async fn handle_sort_request(&self, payload: &Value) -> Result<WorkerSortResponse, SortError> {
        let data = parse_sort_payload(payload)?;
        info!(worker_id = self.identity, items = data.len(), "Worker received sort request");

        let start = Instant::now();
        let sorted = local_sort_blocking(data).await?;
        let elapsed = start.elapsed();

        info!(
            worker_id = self.identity,
            elapsed_secs = elapsed.as_secs_f64(),
            "Worker completed sorting"
        );

        Ok(WorkerSortResponse {
            sorted_data: sorted,
            time_taken: elapsed.as_secs_f64(),
            server_id: self.identity,
        })
    }

    /// Liveness and identity report
    pub fn handle_health_request(&self) -> HealthResponse {
        HealthResponse::healthy(self.identity, self.host.clone(), self.port, Role::Worker)
    }
}

//! Sort service
//!
//! The single entry point the HTTP layer calls on a coordinator. It validates
//! the payload, runs the coordinator, and shapes the outcome into the response
//! body. Invalid payloads are rejected before any worker is contacted.

use crate::config::Config;
use crate::distributed::protocol::{HealthResponse, Role, SortResponse};
use crate::distributed::{Coordinator, HttpPeerClient};
use crate::error::SortError;
use crate::sequence::parse_sort_payload;
use anyhow::Result;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// Coordinator-side sort service
pub struct SortService {
    coordinator: Coordinator,
    host: String,
    port: u16,
}

impl SortService {
    pub fn new(coordinator: Coordinator, host: impl Into<String>, port: u16) -> Self {
        Self {
            coordinator,
            host: host.into(),
            port,
        }
    }

    /// Build a service that talks to the configured roster over HTTP
    pub fn from_config(config: &Config) -> Result<Self> {
        let peers = Arc::new(HttpPeerClient::new(&config.dispatch)?);
        let coordinator = Coordinator::from_config(config, peers);

        Ok(Self::new(
            coordinator,
            config.server.host.clone(),
            config.server.listen_port()?,
        ))
    }

    /// Sort the `data` list of a request payload
    pub async fn sort(&self, payload: &Value) -> Result<SortResponse, SortError> {
        let data = parse_sort_payload(payload)?;
        info!(items = data.len(), "Received sort request");

        let outcome = self.coordinator.sort(data).await?;

        Ok(SortResponse {
            sorted_data: outcome.sorted,
            time_taken: outcome.elapsed.as_secs_f64(),
            server_id: outcome.server_id,
            distributed: outcome.distributed,
        })
    }

    /// Health report including the workers that answer right now
    pub async fn health(&self) -> HealthResponse {
        let mut health = HealthResponse::healthy(
            self.coordinator.identity(),
            self.host.clone(),
            self.port,
            Role::Coordinator,
        );
        health.active_workers = Some(self.coordinator.active_worker_ids().await);
        health
    }
}

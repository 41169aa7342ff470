//! Wire protocol
//!
//! This module defines the JSON bodies exchanged over HTTP between clients,
//! the coordinator, and workers.
//!
//! # Message Flow
//!
//! ```text
//! Client              Coordinator                      Worker
//!   |                      |                              |
//!   |-- POST /sort ------->|                              |
//!   |                      |-- GET /health -------------->|   (probe, per worker)
//!   |                      |<------ HealthResponse -------|
//!   |                      |                              |
//!   |                      |-- POST /sort (chunk) ------->|   (dispatch, per chunk)
//!   |                      |<---- WorkerSortResponse -----|
//!   |                      |                              |
//!   |<-- SortResponse -----|                              |
//! ```
//!
//! Failures on either side are reported as `{ "error": message }`.

use crate::sequence::Number;
use serde::{Deserialize, Serialize};

/// HTTP paths shared by both roles
pub mod endpoints {
    pub const SORT: &str = "/sort";
    pub const HEALTH: &str = "/health";
}

/// Body of a sort request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortRequest {
    pub data: Vec<Number>,
}

/// Coordinator's answer to a sort request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortResponse {
    pub sorted_data: Vec<Number>,
    /// Seconds spent on the server side
    pub time_taken: f64,
    pub server_id: u32,
    /// Whether distribution was attempted (not whether every chunk ran remotely)
    pub distributed: bool,
}

/// Worker's answer to a sort request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerSortResponse {
    pub sorted_data: Vec<Number>,
    pub time_taken: f64,
    pub server_id: u32,
}

/// Role of a server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Coordinator,
    Worker,
}

/// Health report for either role
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub server_id: u32,
    pub host: String,
    pub port: u16,
    pub role: Role,
    /// Ids of workers that answered a probe (coordinator only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_workers: Option<Vec<u32>>,
}

impl HealthResponse {
    pub fn healthy(server_id: u32, host: impl Into<String>, port: u16, role: Role) -> Self {
        Self {
            status: "healthy".to_string(),
            server_id,
            host: host.into(),
            port,
            role,
            active_workers: None,
        }
    }
}

/// Error body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

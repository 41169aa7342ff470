//! Configuration module
//!
//! Handles CLI argument parsing, TOML configuration files, and validation.
//!
//! A configuration has three parts:
//!
//! - `[server]`: identity and listen address of this process
//! - `[[workers]]`: the static worker roster (coordinator only)
//! - `[dispatch]`: thresholds and timeouts of the distribution policy
//!
//! Every field has a default, so an empty file (or no file) yields a coordinator
//! with id 1 on port 5001 and workers 2-5 on `localhost:5002..5005`.

pub mod cli;
pub mod toml;
pub mod validator;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Ports are derived as `BASE_PORT + server_id` unless set explicitly
pub const BASE_PORT: u16 = 5000;

/// Complete process configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default = "default_roster")]
    pub workers: Vec<WorkerDescriptor>,
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            workers: default_roster(),
            dispatch: DispatchConfig::default(),
        }
    }
}

/// Identity and listen address of this process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server identity reported in every response
    #[serde(default = "default_server_id")]
    pub id: u32,
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,
    /// Listen port; derived from `id` when absent
    #[serde(default)]
    pub port: Option<u16>,
    /// Largest accepted request body in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            id: default_server_id(),
            host: default_host(),
            port: None,
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ServerConfig {
    /// Effective listen port
    pub fn listen_port(&self) -> Result<u16> {
        match self.port {
            Some(port) => Ok(port),
            None => derive_port(self.id),
        }
    }

    /// `host:port` string suitable for binding
    pub fn bind_address(&self) -> Result<String> {
        Ok(format!("{}:{}", self.host, self.listen_port()?))
    }
}

/// Derive the conventional port for a server id (`5000 + id`)
pub fn derive_port(server_id: u32) -> Result<u16> {
    u32::from(BASE_PORT)
        .checked_add(server_id)
        .and_then(|p| u16::try_from(p).ok())
        .ok_or_else(|| anyhow::anyhow!("Server id {} does not map to a valid port", server_id))
}

/// A worker endpoint known to the coordinator
///
/// The roster is fixed for the lifetime of the process; there is no
/// registration protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerDescriptor {
    pub id: u32,
    #[serde(default = "default_worker_host")]
    pub host: String,
    pub port: u16,
}

impl WorkerDescriptor {
    pub fn new(id: u32, host: impl Into<String>, port: u16) -> Self {
        Self {
            id,
            host: host.into(),
            port,
        }
    }

    /// Base URL of the worker's HTTP surface
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl fmt::Display for WorkerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "worker {} ({}:{})", self.id, self.host, self.port)
    }
}

/// Distribution policy settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Inputs shorter than this are always sorted locally
    #[serde(default = "default_small_threshold")]
    pub small_threshold: usize,
    /// Smallest chunk worth sending to a worker
    #[serde(default = "default_min_chunk")]
    pub min_chunk: usize,
    /// Liveness probe budget per worker (milliseconds)
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
    /// Sort call budget per chunk (milliseconds)
    #[serde(default = "default_dispatch_timeout_ms")]
    pub dispatch_timeout_ms: u64,
    /// Maximum concurrent probes or dispatches per request (1 = sequential)
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            small_threshold: default_small_threshold(),
            min_chunk: default_min_chunk(),
            probe_timeout_ms: default_probe_timeout_ms(),
            dispatch_timeout_ms: default_dispatch_timeout_ms(),
            max_in_flight: default_max_in_flight(),
        }
    }
}

impl DispatchConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn dispatch_timeout(&self) -> Duration {
        Duration::from_millis(self.dispatch_timeout_ms)
    }
}

fn default_server_id() -> u32 {
    1
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

/// 256 MiB, several million numbers per request
fn default_max_body_bytes() -> usize {
    256 * 1024 * 1024
}

fn default_worker_host() -> String {
    "localhost".to_string()
}

/// Workers 2-5 on localhost, matching the conventional port derivation
fn default_roster() -> Vec<WorkerDescriptor> {
    (2..=5)
        .map(|id| WorkerDescriptor::new(id, default_worker_host(), BASE_PORT + id as u16))
        .collect()
}

fn default_small_threshold() -> usize {
    50
}

fn default_min_chunk() -> usize {
    10
}

fn default_probe_timeout_ms() -> u64 {
    1_000
}

fn default_dispatch_timeout_ms() -> u64 {
    10_000
}

fn default_max_in_flight() -> usize {
    8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.id, 1);
        assert_eq!(config.server.listen_port().unwrap(), 5001);
        assert_eq!(config.workers.len(), 4);
        assert_eq!(config.workers[0], WorkerDescriptor::new(2, "localhost", 5002));
        assert_eq!(config.workers[3].port, 5005);
        assert_eq!(config.dispatch.small_threshold, 50);
        assert_eq!(config.dispatch.min_chunk, 10);
        assert_eq!(config.dispatch.probe_timeout(), Duration::from_secs(1));
        assert_eq!(config.dispatch.dispatch_timeout(), Duration::from_secs(10));
        assert_eq!(config.server.max_body_bytes, 256 * 1024 * 1024);
    }

    #[test]
    fn test_port_derivation() {
        assert_eq!(derive_port(3).unwrap(), 5003);
        assert!(derive_port(70_000).is_err());

        let server = ServerConfig {
            id: 4,
            host: "127.0.0.1".to_string(),
            port: Some(9000),
            ..ServerConfig::default()
        };
        assert_eq!(server.bind_address().unwrap(), "127.0.0.1:9000");
    }

    #[test]
    fn test_worker_base_url() {
        let worker = WorkerDescriptor::new(2, "10.0.1.10", 5002);
        assert_eq!(worker.base_url(), "http://10.0.1.10:5002");
        assert_eq!(worker.to_string(), "worker 2 (10.0.1.10:5002)");
    }
}

//! Configuration validation

use super::*;
use anyhow::{Context, Result};
use std::collections::HashSet;

/// Validate configuration shared by every mode
pub fn validate_config(config: &Config) -> Result<()> {
    validate_server(&config.server)?;
    validate_workers(&config.workers)?;
    validate_dispatch(&config.dispatch)?;

    Ok(())
}

/// Validate configuration for coordinator mode
///
/// In addition to [`validate_config`], the roster must not contain the
/// coordinator itself, otherwise it would dispatch chunks to its own `/sort`
/// and re-enter the distribution policy.
pub fn validate_coordinator_config(config: &Config) -> Result<()> {
    validate_config(config)?;

    if config.workers.iter().any(|w| w.id == config.server.id) {
        anyhow::bail!(
            "Worker roster contains the coordinator's own id ({})",
            config.server.id
        );
    }

    if config.workers.is_empty() {
        tracing::warn!("Worker roster is empty; every request will be sorted locally");
    }

    Ok(())
}

/// Validate server identity and listen address
pub fn validate_server(server: &ServerConfig) -> Result<()> {
    if server.host.trim().is_empty() {
        anyhow::bail!("server.host must not be empty");
    }

    let port = server
        .listen_port()
        .context("Invalid server.id / server.port")?;
    if port == 0 {
        anyhow::bail!("server.port must be non-zero");
    }

    if server.max_body_bytes == 0 {
        anyhow::bail!("server.max_body_bytes must be greater than 0");
    }

    Ok(())
}

/// Validate the worker roster
pub fn validate_workers(workers: &[WorkerDescriptor]) -> Result<()> {
    let mut seen = HashSet::new();

    for worker in workers {
        if !seen.insert(worker.id) {
            anyhow::bail!("Duplicate worker id {} in roster", worker.id);
        }

        if worker.host.trim().is_empty() {
            anyhow::bail!("Worker {} has an empty host", worker.id);
        }

        if worker.port == 0 {
            anyhow::bail!("Worker {} has port 0", worker.id);
        }
    }

    Ok(())
}

/// Validate dispatch thresholds and timeouts
pub fn validate_dispatch(dispatch: &DispatchConfig) -> Result<()> {
    if dispatch.min_chunk == 0 {
        anyhow::bail!("dispatch.min_chunk must be at least 1");
    }

    if dispatch.probe_timeout_ms == 0 {
        anyhow::bail!("dispatch.probe_timeout_ms must be greater than 0");
    }

    if dispatch.dispatch_timeout_ms == 0 {
        anyhow::bail!("dispatch.dispatch_timeout_ms must be greater than 0");
    }

    if dispatch.max_in_flight == 0 {
        anyhow::bail!("dispatch.max_in_flight must be at least 1");
    }

    Ok(())
}

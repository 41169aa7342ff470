//! TOML configuration file parsing

use super::*;
use crate::config::cli::{parse_worker_list, Cli, ExecutionMode};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Parse TOML configuration file
pub fn parse_toml_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_toml_string(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse TOML configuration from string
pub fn parse_toml_string(contents: &str) -> Result<Config> {
    let config: Config = ::toml::from_str(contents)
        .context("Failed to parse TOML configuration")?;

    Ok(config)
}

/// Merge CLI arguments with TOML configuration (CLI takes precedence)
pub fn merge_cli_with_config(cli: &Cli, mut config: Config) -> Result<Config> {
    // Override server identity
    if let Some(id) = cli.server_id {
        config.server.id = id;
        // An explicit id re-derives the port unless --port is also given
        if cli.port.is_none() {
            config.server.port = None;
        }
    }
    if let Some(ref host) = cli.host {
        config.server.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = Some(port);
    }
    if let Some(limit) = cli.max_body_bytes {
        config.server.max_body_bytes = limit;
    }

    // Override roster
    if let Some(ref workers) = cli.workers {
        config.workers = parse_worker_list(workers)?;
    }

    // Override dispatch settings
    if let Some(threshold) = cli.small_threshold {
        config.dispatch.small_threshold = threshold;
    }
    if let Some(min_chunk) = cli.min_chunk {
        config.dispatch.min_chunk = min_chunk;
    }
    if let Some(ms) = cli.probe_timeout_ms {
        config.dispatch.probe_timeout_ms = ms;
    }
    if let Some(ms) = cli.dispatch_timeout_ms {
        config.dispatch.dispatch_timeout_ms = ms;
    }
    if let Some(n) = cli.max_in_flight {
        config.dispatch.max_in_flight = n;
    }

    Ok(config)
}

/// Build the effective configuration: file (or defaults), then CLI overrides, then validation
pub fn load_config(cli: &Cli) -> Result<Config> {
    let base = match cli.config {
        Some(ref path) => parse_toml_file(path)?,
        None => Config::default(),
    };

    let config = merge_cli_with_config(cli, base)?;

    match cli.mode {
        ExecutionMode::Coordinator => validator::validate_coordinator_config(&config),
        _ => validator::validate_config(&config),
    }
    .context("Configuration validation failed")?;

    Ok(config)
}

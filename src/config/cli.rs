//! CLI argument parsing using clap

use super::WorkerDescriptor;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Execution mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExecutionMode {
    /// Coordinator - accepts sort requests and distributes them to workers
    Coordinator,
    /// Worker - sorts chunks sent by a coordinator
    Worker,
    /// Client - sends a list to a running coordinator and reports the result
    Client,
}

/// distsort - Distributed merge sort service
#[derive(Parser, Debug)]
#[command(name = "distsort")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Execution mode: coordinator, worker, or client
    #[arg(long, value_enum, default_value = "coordinator")]
    pub mode: ExecutionMode,

    /// TOML configuration file
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Server identity (listen port defaults to 5000 + id)
    #[arg(long)]
    pub server_id: Option<u32>,

    /// Interface to bind
    #[arg(long)]
    pub host: Option<String>,

    /// Listen port (overrides the id-derived port)
    #[arg(long)]
    pub port: Option<u16>,

    /// Largest accepted request body in bytes
    #[arg(long)]
    pub max_body_bytes: Option<usize>,

    /// Comma-separated worker roster for coordinator mode (e.g., "2@localhost:5002,3@10.0.1.11:5003")
    #[arg(long)]
    pub workers: Option<String>,

    // === Dispatch Options ===
    /// Inputs shorter than this are sorted locally
    #[arg(long)]
    pub small_threshold: Option<usize>,

    /// Smallest chunk worth sending to a worker
    #[arg(long)]
    pub min_chunk: Option<usize>,

    /// Liveness probe timeout in milliseconds
    #[arg(long)]
    pub probe_timeout_ms: Option<u64>,

    /// Chunk sort timeout in milliseconds
    #[arg(long)]
    pub dispatch_timeout_ms: Option<u64>,

    /// Maximum concurrent worker calls per request (1 = sequential)
    #[arg(long)]
    pub max_in_flight: Option<usize>,

    // === Client Options ===
    /// Coordinator URL (client mode only)
    #[arg(long, env = "DISTSORT_COORDINATOR_URL", default_value = "http://localhost:5001")]
    pub coordinator_url: String,

    /// Client mode input: numbers to sort, or `random <size> [min] [max]`
    #[arg(value_name = "ARGS", allow_hyphen_values = true)]
    pub args: Vec<String>,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate CLI arguments
    pub fn validate(&self) -> Result<()> {
        if !self.args.is_empty() && self.mode != ExecutionMode::Client {
            anyhow::bail!(
                "Positional arguments are only accepted in client mode (got {} in {:?} mode)",
                self.args.len(),
                self.mode
            );
        }

        if self.workers.is_some() && self.mode != ExecutionMode::Coordinator {
            anyhow::bail!("--workers can only be used in coordinator mode");
        }

        if let Some(ref workers) = self.workers {
            parse_worker_list(workers)?;
        }

        Ok(())
    }
}

/// Parse a roster of the form `id@host:port,id@host:port`
pub fn parse_worker_list(list: &str) -> Result<Vec<WorkerDescriptor>> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(parse_worker_entry)
        .collect()
}

fn parse_worker_entry(entry: &str) -> Result<WorkerDescriptor> {
    let (id, address) = entry
        .split_once('@')
        .with_context(|| format!("Worker entry '{}' must look like id@host:port", entry))?;

    let (host, port) = address
        .rsplit_once(':')
        .with_context(|| format!("Worker entry '{}' is missing a port", entry))?;

    if host.is_empty() {
        anyhow::bail!("Worker entry '{}' is missing a host", entry);
    }

    let id = id
        .parse::<u32>()
        .with_context(|| format!("Invalid worker id in '{}'", entry))?;
    let port = port
        .parse::<u16>()
        .with_context(|| format!("Invalid worker port in '{}'", entry))?;

    Ok(WorkerDescriptor::new(id, host, port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_worker_list() {
        let workers = parse_worker_list("2@localhost:5002, 3@10.0.1.11:6003").unwrap();
        assert_eq!(
            workers,
            vec![
                WorkerDescriptor::new(2, "localhost", 5002),
                WorkerDescriptor::new(3, "10.0.1.11", 6003),
            ]
        );
    }

    #[test]
    fn test_parse_worker_list_rejects_bad_entries() {
        assert!(parse_worker_list("localhost:5002").is_err());
        assert!(parse_worker_list("2@localhost").is_err());
        assert!(parse_worker_list("x@localhost:5002").is_err());
        assert!(parse_worker_list("2@:5002").is_err());
        assert!(parse_worker_list("2@localhost:99999").is_err());
    }

    #[test]
    fn test_client_args_only_in_client_mode() {
        let cli = Cli::parse_from(["distsort", "--mode", "worker", "5", "3"]);
        assert!(cli.validate().is_err());

        let cli = Cli::parse_from(["distsort", "--mode", "client", "5", "-3", "8"]);
        assert!(cli.validate().is_ok());
        assert_eq!(cli.args, vec!["5", "-3", "8"]);
    }

    #[test]
    fn test_workers_flag_requires_coordinator() {
        let cli = Cli::parse_from(["distsort", "--mode", "worker", "--workers", "2@localhost:5002"]);
        assert!(cli.validate().is_err());

        let cli = Cli::parse_from(["distsort", "--workers", "2@localhost:5002"]);
        assert!(cli.validate().is_ok());
    }
}

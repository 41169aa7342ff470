//! distsort CLI entry point

use anyhow::{Context, Result};
use distsort::api;
use distsort::config::cli::{Cli, ExecutionMode};
use distsort::config::toml::load_config;
use distsort::{SortService, WorkerService};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    cli.validate()?;

    init_tracing();

    let runtime = tokio::runtime::Runtime::new()
        .context("Failed to create tokio runtime")?;

    // Handle different execution modes
    match cli.mode {
        ExecutionMode::Coordinator => runtime.block_on(run_coordinator(cli)),
        ExecutionMode::Worker => runtime.block_on(run_worker(cli)),
        ExecutionMode::Client => runtime.block_on(distsort::client::run(&cli.coordinator_url, &cli.args)),
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "distsort=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Run a coordinator that distributes sort requests over the configured roster
async fn run_coordinator(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    let address = config.server.bind_address()?;

    info!(
        server_id = config.server.id,
        address = %address,
        workers = config.workers.len(),
        "Starting coordinator server"
    );
    for worker in &config.workers {
        info!(%worker, url = %worker.base_url(), "Roster entry");
    }

    let service = SortService::from_config(&config)
        .context("Failed to create sort service")?;

    let router = api::coordinator_router(Arc::new(service), config.server.max_body_bytes);
    api::serve(&address, router).await
}

/// Run a worker that sorts chunks locally
async fn run_worker(cli: Cli) -> Result<()> {
    let mut cli = cli;
    // Worker ids default to 2 so a bare `--mode worker` does not collide with the coordinator
    if cli.server_id.is_none() && cli.config.is_none() {
        cli.server_id = Some(2);
    }

    let config = load_config(&cli)?;
    let address = config.server.bind_address()?;

    info!(server_id = config.server.id, address = %address, "Starting worker server");

    let worker = WorkerService::from_config(&config)?;

    let router = api::worker_router(Arc::new(worker), config.server.max_body_bytes);
    api::serve(&address, router).await
}

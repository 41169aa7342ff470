//! Command-line client
//!
//! Talks to a running coordinator: checks its health, sends a list (given on the
//! command line, typed interactively, or generated at random), and reports the
//! result, including whether it came back correctly ordered.

use crate::distributed::protocol::{endpoints, HealthResponse, SortRequest, SortResponse};
use crate::sequence::{is_sorted, Number};
use anyhow::{Context, Result};
use rand::Rng;
use std::io::Write;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};

const HEALTH_TIMEOUT: Duration = Duration::from_secs(2);
const SORT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default range for generated lists
pub const DEFAULT_MIN: i64 = 1;
pub const DEFAULT_MAX: i64 = 1000;

/// What the client was asked to do
#[derive(Debug, Clone, PartialEq)]
pub enum ClientCommand {
    /// Generate `size` integers in `min..=max`
    Random { size: usize, min: i64, max: i64 },
    /// Sort these numbers
    Numbers(Vec<Number>),
    /// Prompt for input until the user quits
    Interactive,
}

/// Interpret client arguments
///
/// `random <size> [min] [max]` generates a list; anything else must be a list
/// of numbers. No arguments means interactive mode.
pub fn parse_client_args(args: &[String]) -> Result<ClientCommand> {
    let Some(first) = args.first() else {
        return Ok(ClientCommand::Interactive);
    };

    if first.eq_ignore_ascii_case("random") {
        let size = args
            .get(1)
            .context("Usage: random <size> [min_val] [max_val]")?
            .parse::<usize>()
            .context("Invalid list size")?;
        let min = match args.get(2) {
            Some(v) => v.parse::<i64>().context("Invalid min_val")?,
            None => DEFAULT_MIN,
        };
        let max = match args.get(3) {
            Some(v) => v.parse::<i64>().context("Invalid max_val")?,
            None => DEFAULT_MAX,
        };
        if min > max {
            anyhow::bail!("min_val ({}) must not exceed max_val ({})", min, max);
        }
        return Ok(ClientCommand::Random { size, min, max });
    }

    let numbers = args
        .iter()
        .map(|arg| arg.parse::<Number>())
        .collect::<Result<Vec<_>, _>>()
        .context("Invalid arguments. Provide numbers to sort or use 'random'")?;

    Ok(ClientCommand::Numbers(numbers))
}

/// Generate a random list of integers in `min..=max`
pub fn generate_random_list(size: usize, min: i64, max: i64) -> Vec<Number> {
    let mut rng = rand::thread_rng();
    (0..size).map(|_| Number::Int(rng.gen_range(min..=max))).collect()
}

/// HTTP client for a coordinator
#[derive(Debug, Clone)]
pub struct SortClient {
    client: reqwest::Client,
    base_url: String,
}

impl SortClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Fetch the coordinator's health report
    pub async fn health(&self) -> Result<HealthResponse> {
        let response = self
            .client
            .get(self.url(endpoints::HEALTH))
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await
            .context("Cannot connect to coordinator")?;

        if !response.status().is_success() {
            anyhow::bail!("Coordinator returned status code {}", response.status());
        }

        response
            .json()
            .await
            .context("Failed to parse health response")
    }

    /// Ask the coordinator to sort `data`
    pub async fn sort(&self, data: Vec<Number>) -> Result<SortResponse> {
        let response = self
            .client
            .post(self.url(endpoints::SORT))
            .timeout(SORT_TIMEOUT)
            .json(&SortRequest { data })
            .send()
            .await
            .context("Error connecting to coordinator")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("Error from server: {} - {}", status.as_u16(), text);
        }

        response
            .json()
            .await
            .context("Failed to parse sort response")
    }
}

/// Run the client with the given arguments
pub async fn run(coordinator_url: &str, args: &[String]) -> Result<()> {
    let command = parse_client_args(args)?;
    let client = SortClient::new(coordinator_url)?;

    println!("Distributed Merge Sort Client");
    println!("=============================");

    check_system_status(&client).await;

    match command {
        ClientCommand::Random { size, min, max } => {
            println!();
            println!("Generating random list of {} numbers between {} and {}...", size, min, max);
            sort_and_report(&client, generate_random_list(size, min, max)).await
        }
        ClientCommand::Numbers(numbers) => {
            println!();
            println!("Sorting list: {}", format_list(&numbers));
            sort_and_report(&client, numbers).await
        }
        ClientCommand::Interactive => interactive(&client).await,
    }
}

/// Print coordinator status; unreachable coordinators are reported, not fatal
async fn check_system_status(client: &SortClient) {
    match client.health().await {
        Ok(status) => {
            println!();
            println!("System Status:");
            println!("Coordinator is running on server {}", status.server_id);

            match status.active_workers {
                Some(ref workers) if !workers.is_empty() => {
                    let ids: Vec<String> = workers.iter().map(u32::to_string).collect();
                    println!("Active worker servers: {}", ids.join(", "));
                }
                _ => {
                    println!("No active worker servers found!");
                    println!("Start workers with 'distsort --mode worker --server-id <id>'");
                }
            }
        }
        Err(e) => {
            println!("{:#}", e);
            println!("Make sure the coordinator is running with 'distsort --mode coordinator'");
        }
    }
}

async fn sort_and_report(client: &SortClient, numbers: Vec<Number>) -> Result<()> {
    println!();
    println!("Sending list with {} items to the coordinator...", numbers.len());

    let start = Instant::now();
    let result = client.sort(numbers).await?;
    let total = start.elapsed();

    println!();
    println!("Result:");
    if result.distributed {
        println!("List was distributed across multiple servers for sorting");
    } else {
        println!("List was sorted locally on the coordinator");
    }
    println!("Time taken by server: {:.6} seconds", result.time_taken);
    println!("Total time (including network): {:.6} seconds", total.as_secs_f64());
    println!("Correctly sorted: {}", is_sorted(&result.sorted_data));
    println!("Sorted list: {}", format_list(&result.sorted_data));

    Ok(())
}

async fn interactive(client: &SortClient) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        println!();
        print!("Enter numbers separated by spaces, 'random <size> [min] [max]', or 'q' to quit: ");
        std::io::stdout().flush().context("Failed to flush stdout")?;

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };

        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            break;
        }

        let tokens: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        let numbers = match parse_client_args(&tokens) {
            Ok(ClientCommand::Random { size, min, max }) => generate_random_list(size, min, max),
            Ok(ClientCommand::Numbers(numbers)) => numbers,
            Ok(ClientCommand::Interactive) => {
                println!("Empty list provided. Please enter some numbers.");
                continue;
            }
            Err(e) => {
                println!("{:#}", e);
                continue;
            }
        };

        if let Err(e) = sort_and_report(client, numbers).await {
            println!("{:#}", e);
        }
    }

    println!();
    println!("Goodbye!");
    Ok(())
}

fn format_list(numbers: &[Number]) -> String {
    let items: Vec<String> = numbers.iter().map(Number::to_string).collect();
    format!("[{}]", items.join(", "))
}

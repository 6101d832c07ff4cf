//! CLI entry point for the malsim-pathfind attack simulator.
//!
//! Designed for subprocess invocation: reads a JSON request from stdin,
//! writes a JSON result to stdout. Logs go to stderr.

use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use tracing_subscriber::{fmt, EnvFilter};

use malsim_pathfind::types::{
    BreadthRequest, CostEstimateRequest, RandomPathRequest, ShortestPathRequest,
};
use malsim_pathfind::{SimulationConfig, SimulationEngine};

#[derive(Parser)]
#[command(name = "malsim-pathfind")]
#[command(about = "Shortest paths and attack simulation over AND/OR attack graphs")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file prefix (default: malsim).
    #[arg(short, long, default_value = "malsim", global = true)]
    config: String,

    /// Override the configured random seed.
    #[arg(long, global = true)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Command {
    /// Cheapest compromise path to a target (reads JSON from stdin).
    Shortest,
    /// Random walk over the attack surface (reads JSON from stdin).
    Random,
    /// Budgeted breadth sweep from a start node (reads JSON from stdin).
    Breadth,
    /// Generate a per-node cost table (reads JSON from stdin).
    EstimateCosts,
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    let mut config = SimulationConfig::load(&cli.config)?;
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    let engine = SimulationEngine::new().with_config(config);

    match cli.command {
        Command::Shortest => {
            let request: ShortestPathRequest = read_request()?;
            let result = engine.shortest_path(request)?;
            println!("{}", serde_json::to_string(&result)?);
        }
        Command::Random => {
            let request: RandomPathRequest = read_request()?;
            let result = engine.random_path(request)?;
            println!("{}", serde_json::to_string(&result)?);
        }
        Command::Breadth => {
            let request: BreadthRequest = read_request()?;
            let result = engine.bounded_breadth(request)?;
            println!("{}", serde_json::to_string(&result)?);
        }
        Command::EstimateCosts => {
            let request: CostEstimateRequest = read_request()?;
            let result = engine.estimate_costs(request)?;
            println!("{}", serde_json::to_string(&result)?);
        }
    }

    Ok(())
}

fn read_request<T: DeserializeOwned>() -> anyhow::Result<T> {
    let input = std::io::read_to_string(std::io::stdin())?;
    Ok(serde_json::from_str(&input)?)
}

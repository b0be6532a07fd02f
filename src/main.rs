mod cli;
mod config;
mod db;
mod models;
mod services;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[derive(Parser)]
#[command(name = "odds-ingest")]
#[command(about = "Load bookmaker odds into the fixtures database")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch odds and store one row per bookmaker per matched fixture
    Ingest {
        /// Skip the live feed and use the built-in fallback batch
        #[arg(long)]
        fallback: bool,
    },
    /// Initialize the database
    InitDb,
    /// Insert demo teams and fixtures
    Seed,
    /// Show stored odds for a fixture
    Odds {
        #[arg(short, long)]
        fixture: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command {
        Some(Commands::Ingest { fallback }) => {
            tracing::info!("Starting odds ingestion");
            cli::ingest(&config, fallback).await?;
        }
        Some(Commands::InitDb) => {
            tracing::info!("Initializing database...");
            cli::init_db(&config).await?;
        }
        Some(Commands::Seed) => {
            tracing::info!("Seeding demo fixtures...");
            cli::seed(&config).await?;
        }
        Some(Commands::Odds { fixture }) => {
            cli::show_odds(&config, fixture).await?;
        }
        None => {
            // Default to a single ingestion run
            tracing::info!("Starting odds ingestion");
            cli::ingest(&config, false).await?;
        }
    }

    Ok(())
}

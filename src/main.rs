mod config;
mod database;
mod error;
mod generator;
mod log_entry;
mod parser;
mod processor;
mod queue;

use anyhow::Result;
use clap::Parser;
use config::Command;
use log::{info, LevelFilter};
use simple_logger::SimpleLogger;

#[tokio::main]
async fn main() -> Result<()> {
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .env()
        .with_utc_timestamps()
        .init()?;

    // Parse command-line arguments
    let cli = config::Cli::parse();

    // Load configuration
    let config = config::load_config(&cli)?;
    info!("Configuration loaded successfully");

    match cli.command {
        Command::Generate => generator::run(&config).await,
        Command::Process { workers } => processor::run(&config, workers).await,
    }
}

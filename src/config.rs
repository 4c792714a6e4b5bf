use crate::error::PipelineError;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::debug;
use std::env;
use std::path::PathBuf;

pub const DB_CONN_STRING_VAR: &str = "DB_CONN_STRING";
pub const RABBITMQ_URL_VAR: &str = "RABBITMQ_URL";
pub const QUEUE_NAME_VAR: &str = "QUEUE_NAME";

pub const DEFAULT_WORKERS: usize = 3;

#[derive(Parser, Debug)]
#[clap(name = "log-pipeline", version, about)]
pub struct Cli {
    /// Path to a dotenv file with pipeline settings
    #[clap(long, default_value = ".env")]
    pub env_file: PathBuf,

    /// Override database connection string
    #[clap(long)]
    pub db_conn_string: Option<String>,

    /// Override RabbitMQ broker URL
    #[clap(long)]
    pub rabbitmq_url: Option<String>,

    /// Override queue name
    #[clap(long)]
    pub queue_name: Option<String>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Publish synthetic structured logs to the queue
    Generate,

    /// Consume structured logs from the queue and store them in the database
    Process {
        /// Number of concurrent workers draining the queue
        #[clap(long, default_value_t = DEFAULT_WORKERS)]
        workers: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_conn_string: String,
    pub rabbitmq_url: String,
    pub queue_name: String,
}

impl Config {
    /// Resolve settings from `lookup`, letting CLI overrides win.
    ///
    /// Empty values count as missing. Nothing beyond presence is checked.
    pub fn resolve<F>(cli: &Cli, lookup: F) -> Result<Self, PipelineError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let setting = |key: &str, cli_value: &Option<String>| {
            cli_value
                .clone()
                .or_else(|| lookup(key))
                .filter(|value| !value.is_empty())
        };

        let db_conn_string = setting(DB_CONN_STRING_VAR, &cli.db_conn_string);
        let rabbitmq_url = setting(RABBITMQ_URL_VAR, &cli.rabbitmq_url);
        let queue_name = setting(QUEUE_NAME_VAR, &cli.queue_name);

        match (db_conn_string, rabbitmq_url, queue_name) {
            (Some(db_conn_string), Some(rabbitmq_url), Some(queue_name)) => Ok(Config {
                db_conn_string,
                rabbitmq_url,
                queue_name,
            }),
            (db, url, queue) => {
                let missing: Vec<&str> = [
                    (DB_CONN_STRING_VAR, db.is_none()),
                    (RABBITMQ_URL_VAR, url.is_none()),
                    (QUEUE_NAME_VAR, queue.is_none()),
                ]
                .into_iter()
                .filter_map(|(key, absent)| absent.then_some(key))
                .collect();

                Err(PipelineError::ConfigError(format!(
                    "Required environment variables are missing: {}",
                    missing.join(", ")
                )))
            }
        }
    }
}

pub fn load_config(cli: &Cli) -> Result<Config> {
    if cli.env_file.exists() {
        dotenvy::from_path(&cli.env_file)
            .with_context(|| format!("Failed to load env file: {:?}", cli.env_file))?;
        debug!("Loaded settings from {:?}", cli.env_file);
    } else {
        debug!("No env file at {:?}, using process environment", cli.env_file);
    }

    let config = Config::resolve(cli, |key| env::var(key).ok())?;
    Ok(config)
}

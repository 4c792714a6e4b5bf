use crate::config::Config;
use crate::log_entry::StructuredLog;
use crate::queue::QueueClient;
use anyhow::{Context, Result};
use chrono::{DateTime, SubsecRound, Utc};
use log::{error, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::{sleep, Duration};

pub const STATUS_CODES: [i32; 4] = [200, 403, 404, 500];
pub const ENDPOINTS: [&str; 4] = ["/api/login", "/api/upload", "/api/profile", "/api/logout"];
pub const MESSAGES: [&str; 4] = [
    "User logged in",
    "File uploaded",
    "Access denied",
    "Server error occurred",
];
pub const IP_ADDRESSES: [&str; 4] = [
    "192.168.1.10",
    "192.168.1.11",
    "192.168.1.12",
    "192.168.1.13",
];

const MIN_DELAY_SECS: u64 = 1;
const MAX_DELAY_SECS: u64 = 5;

fn pick<'a, T, R: Rng>(rng: &mut R, items: &'a [T]) -> &'a T {
    &items[rng.gen_range(0..items.len())]
}

/// Build a random record stamped with `now`, truncated to whole seconds.
pub fn generate_log<R: Rng>(rng: &mut R, now: DateTime<Utc>) -> StructuredLog {
    StructuredLog {
        status_code: *pick(rng, &STATUS_CODES),
        api: pick(rng, &ENDPOINTS).to_string(),
        message: pick(rng, &MESSAGES).to_string(),
        timestamp: now.trunc_subsecs(0),
        ip_address: pick(rng, &IP_ADDRESSES).to_string(),
    }
}

pub fn format_log(log: &StructuredLog) -> String {
    log.to_string()
}

pub fn next_delay<R: Rng>(rng: &mut R) -> Duration {
    Duration::from_secs(rng.gen_range(MIN_DELAY_SECS..=MAX_DELAY_SECS))
}

pub async fn run(config: &Config) -> Result<()> {
    let queue = QueueClient::connect(&config.rabbitmq_url)
        .await
        .context("Failed to connect to RabbitMQ")?;

    queue
        .declare_queue(&config.queue_name)
        .await
        .context("Failed to declare queue")?;

    info!("Log generator started. Sending structured logs to RabbitMQ...");

    tokio::select! {
        _ = publish_forever(&queue, &config.queue_name) => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, stopping log generator");
        }
    }

    queue.close().await.context("Failed to close RabbitMQ connection")?;
    Ok(())
}

async fn publish_forever(queue: &QueueClient, queue_name: &str) {
    let mut rng = StdRng::from_entropy();

    loop {
        let payload = format_log(&generate_log(&mut rng, Utc::now()));

        match queue.publish(queue_name, payload.as_bytes()).await {
            Ok(()) => info!("Published log: {}", payload),
            Err(e) => error!("Failed to publish log: {}", e),
        }

        sleep(next_delay(&mut rng)).await;
    }
}

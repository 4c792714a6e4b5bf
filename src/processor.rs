use crate::config::Config;
use crate::database::{Database, LogStore};
use crate::error::PipelineError;
use crate::log_entry::StructuredLog;
use crate::parser::parse_log;
use crate::queue::QueueClient;
use anyhow::{Context, Result};
use futures_util::future::join_all;
use futures_util::{Stream, StreamExt};
use log::{error, info, warn};
use std::ops::AddAssign;

/// Per-worker message counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WorkerStats {
    pub stored: u64,
    pub rejected: u64,
    pub failed: u64,
}

impl AddAssign for WorkerStats {
    fn add_assign(&mut self, other: Self) {
        self.stored += other.stored;
        self.rejected += other.rejected;
        self.failed += other.failed;
    }
}

/// Parse one raw payload and hand it to `store`.
///
/// The delivery is already acknowledged, so any error returned here means
/// the message is gone for good.
pub async fn process_payload<S: LogStore>(
    payload: &[u8],
    store: &S,
) -> Result<StructuredLog, PipelineError> {
    let raw = String::from_utf8_lossy(payload);
    info!("Received log: {}", raw);

    let log = parse_log(&raw)?;
    store.insert_structured_log(&log).await?;
    Ok(log)
}

/// Drain `deliveries` until the stream ends or reports an error.
pub async fn run_worker<D, S>(id: usize, mut deliveries: D, store: S) -> WorkerStats
where
    D: Stream<Item = Result<Vec<u8>, lapin::Error>> + Unpin,
    S: LogStore,
{
    let mut stats = WorkerStats::default();
    info!("Worker {} waiting for logs", id);

    while let Some(delivery) = deliveries.next().await {
        let payload = match delivery {
            Ok(payload) => payload,
            Err(e) => {
                error!("Worker {} lost its consumer: {}", id, e);
                break;
            }
        };

        match process_payload(&payload, &store).await {
            Ok(log) => {
                stats.stored += 1;
                info!(
                    "Successfully processed log: {}",
                    serde_json::to_string(&log).unwrap_or_else(|_| format!("{:?}", log))
                );
            }
            Err(PipelineError::ParseError(e)) => {
                stats.rejected += 1;
                warn!("Invalid log format: {}", e);
            }
            Err(e) => {
                stats.failed += 1;
                error!("Failed to insert log into database: {}", e);
            }
        }
    }

    info!("Worker {} finished: {:?}", id, stats);
    stats
}

pub async fn run(config: &Config, workers: usize) -> Result<()> {
    anyhow::ensure!(workers > 0, "At least one worker is required");

    let database = Database::connect(&config.db_conn_string, workers as u32)
        .await
        .context("Failed to connect to database")?;

    let queue = QueueClient::connect(&config.rabbitmq_url)
        .await
        .context("Failed to connect to RabbitMQ")?;

    queue
        .declare_queue(&config.queue_name)
        .await
        .context("Failed to declare RabbitMQ queue")?;

    let mut handles = Vec::with_capacity(workers);
    for id in 1..=workers {
        let deliveries = queue
            .consume(&config.queue_name)
            .await
            .context("Failed to consume messages")?;
        let database = database.clone();

        handles.push(tokio::spawn(async move {
            run_worker(id, deliveries, database).await
        }));
    }

    info!("Started {} workers on queue {}", workers, config.queue_name);

    tokio::select! {
        results = join_all(handles) => {
            let mut total = WorkerStats::default();
            for result in results {
                match result {
                    Ok(stats) => total += stats,
                    Err(e) => error!("Worker task failed: {}", e),
                }
            }
            info!("All logs processed successfully: {:?}", total);
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, stopping log processor");
        }
    }

    queue.close().await.context("Failed to close RabbitMQ connection")?;
    Ok(())
}

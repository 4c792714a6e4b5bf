use crate::log_entry::StructuredLog;
use log::info;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::future::Future;

const INSERT_STRUCTURED_LOG: &str = "INSERT INTO structured_logs (status_code, api_endpoint, message, timestamp, ip_address)
              VALUES ($1, $2, $3, $4, $5)";

/// Destination for parsed logs. Workers only need this one operation.
pub trait LogStore: Send + Sync + 'static {
    fn insert_structured_log(
        &self,
        log: &StructuredLog,
    ) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
}

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;

        info!("Connected to Postgres database");
        Ok(Self { pool })
    }
}

impl LogStore for Database {
    async fn insert_structured_log(&self, log: &StructuredLog) -> Result<(), sqlx::Error> {
        sqlx::query(INSERT_STRUCTURED_LOG)
            .bind(log.status_code)
            .bind(&log.api)
            .bind(&log.message)
            .bind(log.timestamp)
            .bind(&log.ip_address)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

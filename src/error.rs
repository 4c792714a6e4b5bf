use std::num::ParseIntError;
use thiserror::Error;

/// Reasons a raw queue payload cannot be turned into a `StructuredLog`.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("log message must have 5 fields, got {0}")]
    FieldCount(usize),

    #[error("invalid status code {value:?}: {source}")]
    InvalidStatusCode {
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("invalid timestamp {value:?}: {source}")]
    InvalidTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Infrastructure and per-message failures surfaced by the pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("RabbitMQ error: {0}")]
    QueueError(#[from] lapin::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid log format: {0}")]
    ParseError(#[from] ParseError),
}

use thiserror::Error;

use crate::{AggregateId, Version};

/// Errors raised by event store implementations.
#[derive(Debug, Error)]
pub enum EventStoreError {
    /// The aggregate moved on since the caller loaded it.
    #[error(
        "Concurrency conflict for aggregate {aggregate_id}: expected version {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        aggregate_id: AggregateId,
        expected: Version,
        actual: Version,
    },

    /// A batch handed to `append` breaks the append rules.
    #[error("Invalid append: {0}")]
    InvalidAppend(String),

    /// An envelope was built without a required field.
    #[error("Event envelope is missing `{0}`")]
    IncompleteEnvelope(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for event store operations.
pub type Result<T> = std::result::Result<T, EventStoreError>;

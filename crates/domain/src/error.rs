//! Domain error types.

use event_store::EventStoreError;
use thiserror::Error;

use crate::todo::TodoError;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Event store error: {0}")]
    EventStore(#[from] EventStoreError),

    #[error("Todo error: {0}")]
    Todo(TodoError),

    /// A command was refused by an aggregate without a dedicated variant.
    #[error("Command rejected: {0}")]
    Rejected(String),

    /// A stored event could not be decoded into the aggregate's event type.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DomainError {
    /// True when the command lost an optimistic concurrency race.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            DomainError::EventStore(EventStoreError::ConcurrencyConflict { .. })
        )
    }
}

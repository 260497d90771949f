//! Append-only event log for the todo service.
//!
//! Stores [`EventEnvelope`]s per aggregate with optimistic concurrency and
//! keeps the latest serialized read-model [`Snapshot`] per view model and
//! aggregate. Two backends are provided: [`InMemoryEventStore`] and
//! [`PostgresEventStore`].

pub mod error;
pub mod event;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod snapshot;
pub mod store;

pub use common::AggregateId;
pub use error::{EventStoreError, Result};
pub use event::{EventEnvelope, EventEnvelopeBuilder, EventId, Version};
pub use memory::InMemoryEventStore;
pub use postgres::PostgresEventStore;
pub use query::EventQuery;
pub use snapshot::Snapshot;
pub use store::{AppendOptions, EventStore, EventStoreExt, EventStream};

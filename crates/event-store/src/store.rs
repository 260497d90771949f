use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

use crate::{AggregateId, EventEnvelope, EventQuery, EventStoreError, Result, Snapshot, Version};

/// Options for [`EventStore::append`].
#[derive(Debug, Clone, Default)]
pub struct AppendOptions {
    /// Version the aggregate must be at for the append to succeed.
    /// `None` skips the check.
    pub expected_version: Option<Version>,
}

impl AppendOptions {
    /// No version check.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expect_version(version: Version) -> Self {
        Self {
            expected_version: Some(version),
        }
    }

    /// The aggregate must have no events yet.
    pub fn expect_new() -> Self {
        Self::expect_version(Version::initial())
    }
}

pub type EventStream = Pin<Box<dyn Stream<Item = Result<EventEnvelope>> + Send>>;

/// Persistence for the event log and for read-model snapshots.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Appends a batch of events for one aggregate atomically.
    ///
    /// Fails with `ConcurrencyConflict` when `options.expected_version` is
    /// set and differs from the stored version. Returns the version of the
    /// last appended event.
    async fn append(&self, events: Vec<EventEnvelope>, options: AppendOptions) -> Result<Version>;

    /// All events of one aggregate, oldest first.
    async fn get_events_for_aggregate(
        &self,
        aggregate_id: AggregateId,
    ) -> Result<Vec<EventEnvelope>>;

    /// Events of one aggregate with `version >= from_version`, oldest first.
    async fn get_events_for_aggregate_from_version(
        &self,
        aggregate_id: AggregateId,
        from_version: Version,
    ) -> Result<Vec<EventEnvelope>>;

    async fn query_events(&self, query: EventQuery) -> Result<Vec<EventEnvelope>>;

    /// Streams the whole log in insertion order.
    async fn stream_all_events(&self) -> Result<EventStream>;

    /// Current version of an aggregate, or `None` if it has no events.
    async fn get_aggregate_version(&self, aggregate_id: AggregateId) -> Result<Option<Version>>;

    /// Stores a read-model snapshot, replacing any previous one for the
    /// same view model and aggregate.
    async fn save_snapshot(&self, snapshot: Snapshot) -> Result<()>;

    /// Latest snapshot of `view_model` for `aggregate_id`.
    async fn get_snapshot(
        &self,
        view_model: &str,
        aggregate_id: AggregateId,
    ) -> Result<Option<Snapshot>>;
}

/// Convenience methods available on every [`EventStore`].
#[async_trait]
pub trait EventStoreExt: EventStore {
    /// Fetches what a view model needs to rebuild one aggregate's state:
    /// the latest snapshot, if any, and every event after it.
    async fn load_view_model_inputs(
        &self,
        view_model: &str,
        aggregate_id: AggregateId,
    ) -> Result<(Option<Snapshot>, Vec<EventEnvelope>)> {
        match self.get_snapshot(view_model, aggregate_id).await? {
            Some(snapshot) => {
                let events = self
                    .get_events_for_aggregate_from_version(aggregate_id, snapshot.version.next())
                    .await?;
                Ok((Some(snapshot), events))
            }
            None => {
                let events = self.get_events_for_aggregate(aggregate_id).await?;
                Ok((None, events))
            }
        }
    }
}

impl<T: EventStore + ?Sized> EventStoreExt for T {}

/// Checks the batch rules shared by every backend: non-empty, a single
/// aggregate and aggregate type, and consecutive versions.
pub fn validate_events_for_append(events: &[EventEnvelope]) -> Result<()> {
    let Some(first) = events.first() else {
        return Err(invalid("cannot append an empty event list"));
    };

    let mut expected_version = first.version;
    for event in &events[1..] {
        if event.aggregate_id != first.aggregate_id {
            return Err(invalid("all events must belong to the same aggregate"));
        }
        if event.aggregate_type != first.aggregate_type {
            return Err(invalid("all events must have the same aggregate type"));
        }
        expected_version = expected_version.next();
        if event.version != expected_version {
            return Err(invalid(&format!(
                "event versions must be sequential: expected {expected_version}, got {}",
                event.version
            )));
        }
    }

    Ok(())
}

fn invalid(message: &str) -> EventStoreError {
    EventStoreError::InvalidAppend(message.to_string())
}

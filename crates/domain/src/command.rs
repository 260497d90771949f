//! Command handling infrastructure.

use std::marker::PhantomData;

use common::AggregateId;
use event_store::{AppendOptions, EventEnvelope, EventStore, Version};

use crate::aggregate::{Aggregate, DomainEvent};
use crate::error::DomainError;

/// Outcome of a successfully executed command.
#[derive(Debug)]
pub struct CommandResult<A: Aggregate> {
    /// The aggregate with the new events applied.
    pub aggregate: A,

    /// Events produced and persisted by the command.
    pub events: Vec<A::Event>,

    /// Envelopes as they were written to the store.
    pub envelopes: Vec<EventEnvelope>,

    pub new_version: Version,
}

/// A request addressed to one aggregate instance.
pub trait Command: Send + Sync {
    type Aggregate: Aggregate;

    fn aggregate_id(&self) -> AggregateId;
}

/// Loads an aggregate, runs a command against it and persists the result.
///
/// Writes use optimistic concurrency: the append expects the version the
/// aggregate was loaded at, so two racing commands on the same aggregate
/// cannot both succeed.
pub struct CommandHandler<S, A>
where
    S: EventStore,
    A: Aggregate,
{
    store: S,
    _aggregate: PhantomData<A>,
}

impl<S, A> CommandHandler<S, A>
where
    S: EventStore,
    A: Aggregate,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            _aggregate: PhantomData,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Rebuilds an aggregate by replaying its events, or only reads its
    /// version when [`Aggregate::REPLAYS_EVENTS`] is `false`.
    ///
    /// An aggregate without events comes back as `A::default()`.
    pub async fn load(&self, aggregate_id: AggregateId) -> Result<A, DomainError> {
        let mut aggregate = A::default();

        if !A::REPLAYS_EVENTS {
            if let Some(version) = self.store.get_aggregate_version(aggregate_id).await? {
                aggregate.set_version(version);
            }
            return Ok(aggregate);
        }

        let envelopes = self.store.get_events_for_aggregate(aggregate_id).await?;
        for envelope in envelopes {
            let event: A::Event = envelope.decode()?;
            aggregate.apply(event);
            aggregate.set_version(envelope.version);
        }

        Ok(aggregate)
    }

    /// Executes `command_fn` against the current state and appends the
    /// events it returns.
    ///
    /// An empty event list is a successful no-op and nothing is written.
    pub async fn execute<F>(
        &self,
        aggregate_id: AggregateId,
        command_fn: F,
    ) -> Result<CommandResult<A>, DomainError>
    where
        F: FnOnce(&A) -> Result<Vec<A::Event>, A::Error>,
        DomainError: From<A::Error>,
    {
        let mut aggregate = self.load(aggregate_id).await?;
        let current_version = aggregate.version();

        let events = command_fn(&aggregate)?;
        if events.is_empty() {
            return Ok(CommandResult {
                aggregate,
                events,
                envelopes: Vec::new(),
                new_version: current_version,
            });
        }

        let envelopes = self.build_envelopes(aggregate_id, current_version, &events)?;
        let new_version = self
            .store
            .append(envelopes.clone(), AppendOptions::expect_version(current_version))
            .await?;

        aggregate.apply_events(events.iter().cloned());
        aggregate.set_version(new_version);

        Ok(CommandResult {
            aggregate,
            events,
            envelopes,
            new_version,
        })
    }

    fn build_envelopes(
        &self,
        aggregate_id: AggregateId,
        current_version: Version,
        events: &[A::Event],
    ) -> Result<Vec<EventEnvelope>, DomainError> {
        let mut version = current_version;
        events
            .iter()
            .map(|event| {
                version = version.next();
                let envelope = EventEnvelope::builder()
                    .aggregate_id(aggregate_id)
                    .aggregate_type(A::aggregate_type())
                    .event_type(event.event_type())
                    .version(version)
                    .payload(event)?
                    .build()?;
                Ok(envelope)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use event_store::InMemoryEventStore;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize)]
    enum NoteEvent {
        Written { text: String },
    }

    impl DomainEvent for NoteEvent {
        fn event_type(&self) -> &'static str {
            "NOTE_WRITTEN"
        }
    }

    #[derive(Debug, Default)]
    struct Notebook {
        notes: Vec<String>,
        version: Version,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("note is empty")]
    struct EmptyNote;

    impl From<EmptyNote> for DomainError {
        fn from(e: EmptyNote) -> Self {
            DomainError::Rejected(e.to_string())
        }
    }

    impl Aggregate for Notebook {
        type Event = NoteEvent;
        type Error = EmptyNote;

        fn aggregate_type() -> &'static str {
            "Notebook"
        }

        fn version(&self) -> Version {
            self.version
        }

        fn set_version(&mut self, version: Version) {
            self.version = version;
        }

        fn apply(&mut self, event: Self::Event) {
            let NoteEvent::Written { text } = event;
            self.notes.push(text);
        }
    }

    fn write(text: &str) -> impl FnOnce(&Notebook) -> Result<Vec<NoteEvent>, EmptyNote> + '_ {
        move |_| {
            if text.is_empty() {
                Err(EmptyNote)
            } else {
                Ok(vec![NoteEvent::Written {
                    text: text.to_string(),
                }])
            }
        }
    }

    #[tokio::test]
    async fn execute_persists_and_applies() {
        let store = InMemoryEventStore::new();
        let handler: CommandHandler<_, Notebook> = CommandHandler::new(store.clone());
        let id = AggregateId::new();

        let result = handler.execute(id, write("first")).await.unwrap();

        assert_eq!(result.new_version, Version::first());
        assert_eq!(result.aggregate.notes, vec!["first"]);
        assert_eq!(result.envelopes.len(), 1);
        assert_eq!(result.envelopes[0].event_type, "NOTE_WRITTEN");
        assert_eq!(result.envelopes[0].aggregate_type, "Notebook");
        assert_eq!(store.event_count().await, 1);
    }

    #[tokio::test]
    async fn execute_continues_from_stored_version() {
        let handler: CommandHandler<_, Notebook> = CommandHandler::new(InMemoryEventStore::new());
        let id = AggregateId::new();

        handler.execute(id, write("first")).await.unwrap();
        let result = handler.execute(id, write("second")).await.unwrap();

        assert_eq!(result.new_version, Version::new(2));
        assert_eq!(result.aggregate.notes, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn rejection_writes_nothing() {
        let store = InMemoryEventStore::new();
        let handler: CommandHandler<_, Notebook> = CommandHandler::new(store.clone());

        let result = handler.execute(AggregateId::new(), write("")).await;

        assert!(matches!(result, Err(DomainError::Rejected(_))));
        assert_eq!(store.event_count().await, 0);
    }

    #[tokio::test]
    async fn empty_event_list_is_a_no_op() {
        let store = InMemoryEventStore::new();
        let handler: CommandHandler<_, Notebook> = CommandHandler::new(store.clone());

        let result = handler
            .execute(AggregateId::new(), |_| Ok(vec![]))
            .await
            .unwrap();

        assert!(result.events.is_empty());
        assert_eq!(result.new_version, Version::initial());
        assert_eq!(store.event_count().await, 0);
    }

    #[tokio::test]
    async fn load_replays_history() {
        let handler: CommandHandler<_, Notebook> = CommandHandler::new(InMemoryEventStore::new());
        let id = AggregateId::new();

        assert_eq!(handler.load(id).await.unwrap().version(), Version::initial());

        handler.execute(id, write("note")).await.unwrap();
        let loaded = handler.load(id).await.unwrap();
        assert_eq!(loaded.notes, vec!["note"]);
        assert_eq!(loaded.version(), Version::first());
    }

    #[tokio::test]
    async fn replaying_aggregate_fails_on_undecodable_history() {
        let store = InMemoryEventStore::new();
        let id = AggregateId::new();
        let garbled = EventEnvelope::builder()
            .aggregate_id(id)
            .aggregate_type("Notebook")
            .event_type("NOTE_WRITTEN")
            .version(Version::first())
            .payload_raw(serde_json::json!({"unexpected": true}))
            .build()
            .unwrap();
        store.append(vec![garbled], AppendOptions::expect_new()).await.unwrap();

        let handler: CommandHandler<_, Notebook> = CommandHandler::new(store);
        assert!(matches!(
            handler.load(id).await,
            Err(DomainError::Serialization(_))
        ));
    }
}

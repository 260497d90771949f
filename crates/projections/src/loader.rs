//! On-demand view model loading from a snapshot plus the event tail.

use common::AggregateId;
use event_store::{EventStore, EventStoreExt, Snapshot, Version};

use crate::view_model::ViewModel;
use crate::{ProjectionError, Result};

/// Number of newly folded events after which a snapshot is written.
pub const DEFAULT_SNAPSHOT_INTERVAL: u64 = 50;

/// A view model state together with where it stands in the event log.
#[derive(Debug, Clone)]
pub struct LoadedViewModel<T> {
    pub state: T,

    /// Version of the last event reflected in `state`.
    pub version: Version,

    /// Version of the snapshot the load started from, if any.
    pub snapshot_version: Option<Version>,

    /// Events folded on top of the snapshot (or `init`).
    pub events_applied: u64,
}

/// Rebuilds view model state for one aggregate.
///
/// Starts from the latest snapshot when one exists and folds only the
/// events recorded after it. A snapshot that does not deserialize fails
/// the load rather than silently rebuilding.
pub struct ViewModelLoader<S, V> {
    store: S,
    view_model: V,
    snapshot_interval: u64,
}

impl<S, V> ViewModelLoader<S, V>
where
    S: EventStore,
    V: ViewModel,
{
    pub fn new(store: S, view_model: V) -> Self {
        Self {
            store,
            view_model,
            snapshot_interval: DEFAULT_SNAPSHOT_INTERVAL,
        }
    }

    /// Sets the snapshot interval; `0` disables snapshot writes.
    pub fn with_snapshot_interval(mut self, interval: u64) -> Self {
        self.snapshot_interval = interval;
        self
    }

    pub fn view_model(&self) -> &V {
        &self.view_model
    }

    pub fn snapshot_interval(&self) -> u64 {
        self.snapshot_interval
    }

    #[tracing::instrument(skip(self), fields(view_model = self.view_model.name()))]
    pub async fn load(&self, aggregate_id: AggregateId) -> Result<LoadedViewModel<V::State>> {
        let (snapshot, events) = self
            .store
            .load_view_model_inputs(self.view_model.name(), aggregate_id)
            .await?;

        let (mut state, mut version, snapshot_version) = match snapshot {
            Some(snapshot) => (
                self.view_model.deserialize_state(snapshot.state())?,
                snapshot.version,
                Some(snapshot.version),
            ),
            None => (self.view_model.init(), Version::initial(), None),
        };

        for envelope in &events {
            if envelope.version != version.next() {
                return Err(ProjectionError::Projection(format!(
                    "{} for {aggregate_id}: expected version {} after {version}, found {}",
                    self.view_model.name(),
                    version.next(),
                    envelope.version
                )));
            }
            state = self.view_model.apply_envelope(state, envelope)?;
            version = envelope.version;
        }

        tracing::debug!(
            %version,
            events_applied = events.len(),
            from_snapshot = snapshot_version.is_some(),
            "view model loaded"
        );

        Ok(LoadedViewModel {
            state,
            version,
            snapshot_version,
            events_applied: events.len() as u64,
        })
    }

    /// Loads like [`load`](Self::load), then stores a fresh snapshot when
    /// at least `snapshot_interval` events were folded past the previous one.
    pub async fn load_and_snapshot(
        &self,
        aggregate_id: AggregateId,
    ) -> Result<LoadedViewModel<V::State>> {
        let loaded = self.load(aggregate_id).await?;

        if self.snapshot_interval > 0 && loaded.events_applied >= self.snapshot_interval {
            let text = self.view_model.serialize_state(&loaded.state)?;
            self.store
                .save_snapshot(Snapshot::new(
                    self.view_model.name(),
                    aggregate_id,
                    loaded.version,
                    text,
                ))
                .await?;

            metrics::counter!("view_model_snapshots_saved", "view_model" => self.view_model.name())
                .increment(1);
            tracing::info!(
                view_model = self.view_model.name(),
                %aggregate_id,
                version = %loaded.version,
                "snapshot saved"
            );
        }

        Ok(loaded)
    }

    /// Loads and serializes the state in one step.
    pub async fn load_serialized(&self, aggregate_id: AggregateId) -> Result<String> {
        let loaded = self.load_and_snapshot(aggregate_id).await?;
        self.view_model.serialize_state(&loaded.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::{TodosState, TodosViewModel};
    use domain::{DomainEvent, TodoEvent};
    use event_store::{AppendOptions, EventEnvelope, InMemoryEventStore};

    fn make_envelope(list: AggregateId, version: i64, event: &TodoEvent) -> EventEnvelope {
        EventEnvelope::builder()
            .aggregate_id(list)
            .aggregate_type("Todo")
            .event_type(event.event_type())
            .version(Version::new(version))
            .payload(event)
            .unwrap()
            .build()
            .unwrap()
    }

    async fn seed(store: &InMemoryEventStore, list: AggregateId, events: &[TodoEvent]) {
        let current = store
            .get_aggregate_version(list)
            .await
            .unwrap()
            .unwrap_or_default();
        let envelopes = events
            .iter()
            .enumerate()
            .map(|(i, e)| make_envelope(list, current.as_i64() + i as i64 + 1, e))
            .collect();
        store
            .append(envelopes, AppendOptions::expect_version(current))
            .await
            .unwrap();
    }

    fn created(n: usize) -> Vec<TodoEvent> {
        (0..n)
            .map(|i| TodoEvent::item_created(i.to_string(), format!("item {i}")))
            .collect()
    }

    #[tokio::test]
    async fn load_without_events_is_init() {
        let loader = ViewModelLoader::new(InMemoryEventStore::new(), TodosViewModel);
        let loaded = loader.load(AggregateId::new()).await.unwrap();

        assert!(loaded.state.is_empty());
        assert_eq!(loaded.version, Version::initial());
        assert_eq!(loaded.snapshot_version, None);
        assert_eq!(loaded.events_applied, 0);
    }

    #[tokio::test]
    async fn load_folds_full_history() {
        let store = InMemoryEventStore::new();
        let list = AggregateId::new();
        seed(
            &store,
            list,
            &[
                TodoEvent::item_created("1", "Buy milk"),
                TodoEvent::item_checked("1"),
            ],
        )
        .await;

        let loader = ViewModelLoader::new(store, TodosViewModel);
        let loaded = loader.load(list).await.unwrap();

        assert_eq!(loaded.version, Version::new(2));
        assert!(loaded.state.get(&"1".into()).unwrap().checked);
    }

    #[tokio::test]
    async fn snapshot_written_once_interval_is_reached() {
        let store = InMemoryEventStore::new();
        let list = AggregateId::new();
        let loader = ViewModelLoader::new(store.clone(), TodosViewModel).with_snapshot_interval(3);

        seed(&store, list, &created(2)).await;
        loader.load_and_snapshot(list).await.unwrap();
        assert_eq!(store.snapshot_count().await, 0);

        seed(&store, list, &created(1)).await;
        loader.load_and_snapshot(list).await.unwrap();
        let snapshot = store.get_snapshot("Todos", list).await.unwrap().unwrap();
        assert_eq!(snapshot.version, Version::new(3));
    }

    #[tokio::test]
    async fn load_resumes_from_snapshot() {
        let store = InMemoryEventStore::new();
        let list = AggregateId::new();
        let loader = ViewModelLoader::new(store.clone(), TodosViewModel).with_snapshot_interval(2);

        seed(&store, list, &created(2)).await;
        loader.load_and_snapshot(list).await.unwrap();
        seed(&store, list, &[TodoEvent::item_removed("0")]).await;

        let loaded = loader.load(list).await.unwrap();
        assert_eq!(loaded.snapshot_version, Some(Version::new(2)));
        assert_eq!(loaded.events_applied, 1);
        assert_eq!(loaded.version, Version::new(3));

        let full = TodosViewModel
            .replay(&store.get_events_for_aggregate(list).await.unwrap())
            .unwrap();
        assert_eq!(loaded.state, full);
    }

    #[tokio::test]
    async fn snapshot_state_is_what_gets_restored() {
        let store = InMemoryEventStore::new();
        let list = AggregateId::new();
        seed(&store, list, &created(1)).await;

        let mut planted = TodosState::new();
        planted.apply(&TodoEvent::item_created("seeded", "from snapshot"));
        let text = TodosViewModel.serialize_state(&planted).unwrap();
        store
            .save_snapshot(Snapshot::new("Todos", list, Version::new(1), text))
            .await
            .unwrap();

        let loaded = ViewModelLoader::new(store, TodosViewModel)
            .load(list)
            .await
            .unwrap();
        assert_eq!(loaded.state, planted);
        assert_eq!(loaded.events_applied, 0);
    }

    #[tokio::test]
    async fn corrupt_snapshot_fails_the_load() {
        let store = InMemoryEventStore::new();
        let list = AggregateId::new();
        seed(&store, list, &created(1)).await;
        store
            .save_snapshot(Snapshot::new("Todos", list, Version::new(1), "{not json"))
            .await
            .unwrap();

        let result = ViewModelLoader::new(store, TodosViewModel).load(list).await;
        assert!(matches!(result, Err(ProjectionError::Deserialization(_))));
    }

    #[tokio::test]
    async fn zero_interval_never_snapshots() {
        let store = InMemoryEventStore::new();
        let list = AggregateId::new();
        seed(&store, list, &created(5)).await;

        let loader = ViewModelLoader::new(store.clone(), TodosViewModel).with_snapshot_interval(0);
        let text = loader.load_serialized(list).await.unwrap();

        assert!(text.starts_with(r#"{"0":{"text":"item 0""#));
        assert_eq!(store.snapshot_count().await, 0);
    }
}

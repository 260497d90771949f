//! Todos view model and its per-list read model.

use std::collections::btree_map::{self, BTreeMap};
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{AggregateId, ItemId};
use domain::{Aggregate, Todo, TodoEvent};
use event_store::EventEnvelope;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::Result;
use crate::projection::{Projection, ProjectionPosition};
use crate::read_model::ReadModel;
use crate::view_model::ViewModel;

/// One item of a todo list.
///
/// `text` is `None` only for a partial entry: an item that was checked or
/// unchecked without ever being created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub checked: bool,
}

impl TodoEntry {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            checked: false,
        }
    }

    pub fn is_partial(&self) -> bool {
        self.text.is_none()
    }
}

/// Items of one todo list keyed by item id.
///
/// Serializes as a JSON object with keys in sorted order, e.g.
/// `{"1":{"text":"Buy milk","checked":true}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodosState {
    items: BTreeMap<ItemId, TodoEntry>,
}

impl TodosState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &ItemId) -> Option<&TodoEntry> {
        self.items.get(id)
    }

    pub fn items(&self) -> impl Iterator<Item = (&ItemId, &TodoEntry)> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Ids of entries that have a `checked` flag but no text.
    pub fn partial_entries(&self) -> Vec<&ItemId> {
        self.items
            .iter()
            .filter(|(_, entry)| entry.is_partial())
            .map(|(id, _)| id)
            .collect()
    }

    /// Applies one event in place.
    pub fn apply(&mut self, event: &TodoEvent) {
        match event {
            TodoEvent::ItemCreated(data) => {
                self.items
                    .insert(data.id.clone(), TodoEntry::new(data.text.clone()));
            }
            TodoEvent::ItemChecked(data) => self.entry_or_partial(&data.id).checked = true,
            TodoEvent::ItemUnchecked(data) => self.entry_or_partial(&data.id).checked = false,
            TodoEvent::ItemRemoved(data) => {
                self.items.remove(&data.id);
            }
        }
    }

    fn entry_or_partial(&mut self, id: &ItemId) -> &mut TodoEntry {
        match self.items.entry(id.clone()) {
            btree_map::Entry::Occupied(entry) => entry.into_mut(),
            btree_map::Entry::Vacant(entry) => {
                tracing::warn!(item_id = %id, "flag set on unknown item, recording partial entry");
                entry.insert(TodoEntry::default())
            }
        }
    }
}

/// The "Todos" view model over [`TodoEvent`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct TodosViewModel;

impl TodosViewModel {
    pub const NAME: &'static str = "Todos";
}

impl ViewModel for TodosViewModel {
    type State = TodosState;
    type Event = TodoEvent;

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn event_types(&self) -> &'static [&'static str] {
        &[
            TodoEvent::ITEM_CREATED,
            TodoEvent::ITEM_CHECKED,
            TodoEvent::ITEM_UNCHECKED,
            TodoEvent::ITEM_REMOVED,
        ]
    }

    fn init(&self) -> TodosState {
        TodosState::new()
    }

    fn project(&self, mut state: TodosState, event: &TodoEvent) -> TodosState {
        state.apply(event);
        state
    }

    fn serialize_state(&self, state: &TodosState) -> Result<String> {
        Ok(serde_json::to_string(state)?)
    }

    fn deserialize_state(&self, text: &str) -> Result<TodosState> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Todos state for every list, kept current by the projection processor.
#[derive(Clone)]
pub struct TodosView {
    view_model: TodosViewModel,
    lists: Arc<RwLock<HashMap<AggregateId, TodosState>>>,
    position: Arc<RwLock<ProjectionPosition>>,
}

impl TodosView {
    pub fn new() -> Self {
        Self {
            view_model: TodosViewModel,
            lists: Arc::new(RwLock::new(HashMap::new())),
            position: Arc::new(RwLock::new(ProjectionPosition::zero())),
        }
    }

    /// State of one list; the initial empty state for lists without events.
    pub async fn get_list(&self, list_id: AggregateId) -> TodosState {
        self.lists
            .read()
            .await
            .get(&list_id)
            .cloned()
            .unwrap_or_else(|| self.view_model.init())
    }

    /// Serialized state of one list.
    pub async fn get_serialized(&self, list_id: AggregateId) -> Result<String> {
        let state = self.get_list(list_id).await;
        self.view_model.serialize_state(&state)
    }

    pub async fn list_ids(&self) -> Vec<AggregateId> {
        let mut ids: Vec<_> = self.lists.read().await.keys().copied().collect();
        ids.sort();
        ids
    }

    pub async fn get_all(&self) -> HashMap<AggregateId, TodosState> {
        self.lists.read().await.clone()
    }
}

impl Default for TodosView {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Projection for TodosView {
    fn name(&self) -> &'static str {
        "TodosView"
    }

    /// Folds Todo events into their list. An event whose payload does not
    /// decode is logged and skipped; the position still advances past it so
    /// later catch-ups are not stuck on it.
    async fn handle(&self, event: &EventEnvelope) -> Result<()> {
        if event.aggregate_type == Todo::aggregate_type()
            && self.view_model.handles(&event.event_type)
        {
            match event.decode::<TodoEvent>() {
                Ok(todo_event) => {
                    let mut lists = self.lists.write().await;
                    lists
                        .entry(event.aggregate_id)
                        .or_default()
                        .apply(&todo_event);
                }
                Err(error) => {
                    metrics::counter!("projections_events_skipped", "projection" => "TodosView")
                        .increment(1);
                    tracing::warn!(
                        event_id = %event.event_id,
                        event_type = %event.event_type,
                        list_id = %event.aggregate_id,
                        %error,
                        "skipping undecodable todo event"
                    );
                }
            }
        }

        let mut pos = self.position.write().await;
        *pos = pos.advance();

        Ok(())
    }

    async fn position(&self) -> ProjectionPosition {
        *self.position.read().await
    }

    async fn reset(&self) -> Result<()> {
        self.lists.write().await.clear();
        *self.position.write().await = ProjectionPosition::zero();
        Ok(())
    }
}

impl ReadModel for TodosView {
    fn name(&self) -> &'static str {
        "TodosView"
    }

    fn count(&self) -> usize {
        self.lists.try_read().map(|l| l.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::DomainEvent;
    use event_store::Version;

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

    fn fold(events: &[TodoEvent]) -> TodosState {
        events
            .iter()
            .fold(TodosViewModel.init(), |s, e| TodosViewModel.project(s, e))
    }

    fn id(s: &str) -> ItemId {
        ItemId::new(s)
    }

    #[test]
    fn init_is_empty() {
        let state = TodosViewModel.init();
        assert!(state.is_empty());
        assert_eq!(TodosViewModel.serialize_state(&state).unwrap(), "{}");
    }

    #[test]
    fn buy_milk_scenario() {
        let mut state = fold(&[
            TodoEvent::item_created("1", "Buy milk"),
            TodoEvent::item_checked("1"),
        ]);
        assert_eq!(
            state.get(&id("1")),
            Some(&TodoEntry {
                text: Some("Buy milk".to_string()),
                checked: true
            })
        );
        assert_eq!(
            TodosViewModel.serialize_state(&state).unwrap(),
            r#"{"1":{"text":"Buy milk","checked":true}}"#
        );

        state = TodosViewModel.project(state, &TodoEvent::item_removed("1"));
        assert!(state.is_empty());
        assert_eq!(TodosViewModel.serialize_state(&state).unwrap(), "{}");
    }

    #[test]
    fn create_overwrites_existing_entry() {
        let state = fold(&[
            TodoEvent::item_created("1", "a"),
            TodoEvent::item_checked("1"),
            TodoEvent::item_created("1", "b"),
        ]);
        assert_eq!(state.get(&id("1")), Some(&TodoEntry::new("b")));
    }

    #[test]
    fn check_preserves_text() {
        let state = fold(&[
            TodoEvent::item_created("1", "a"),
            TodoEvent::item_created("2", "b"),
            TodoEvent::item_checked("2"),
        ]);
        assert_eq!(state.get(&id("1")), Some(&TodoEntry::new("a")));
        assert_eq!(state.get(&id("2")).unwrap().text.as_deref(), Some("b"));
        assert!(state.get(&id("2")).unwrap().checked);
    }

    #[test]
    fn check_on_absent_item_records_partial_entry() {
        let state = fold(&[TodoEvent::item_checked("ghost")]);
        assert_eq!(
            state.get(&id("ghost")),
            Some(&TodoEntry {
                text: None,
                checked: true
            })
        );
        assert_eq!(state.partial_entries(), vec![&id("ghost")]);
        assert_eq!(
            TodosViewModel.serialize_state(&state).unwrap(),
            r#"{"ghost":{"checked":true}}"#
        );
    }

    #[test]
    fn uncheck_on_absent_item_records_partial_entry() {
        let state = fold(&[TodoEvent::item_unchecked("ghost")]);
        assert_eq!(
            state.get(&id("ghost")),
            Some(&TodoEntry {
                text: None,
                checked: false
            })
        );
    }

    #[test]
    fn remove_absent_item_is_a_no_op() {
        let state = fold(&[TodoEvent::item_created("1", "a")]);
        let after = TodosViewModel.project(state.clone(), &TodoEvent::item_removed("2"));
        assert_eq!(after, state);
    }

    #[test]
    fn deserialize_accepts_partial_entries() {
        let state = TodosViewModel
            .deserialize_state(r#"{"ghost":{"checked":true},"1":{"text":"","checked":false}}"#)
            .unwrap();
        assert_eq!(state.len(), 2);
        assert_eq!(state.partial_entries(), vec![&id("ghost")]);
        assert_eq!(state.get(&id("1")), Some(&TodoEntry::new("")));
    }

    #[test]
    fn deserialize_rejects_malformed_text() {
        for text in ["", "not json", "[]", r#"{"1":{"text":"a"}}"#, r#"{"1":5}"#] {
            assert!(
                matches!(
                    TodosViewModel.deserialize_state(text),
                    Err(crate::ProjectionError::Deserialization(_))
                ),
                "accepted {text:?}"
            );
        }
    }

    #[test]
    fn unhandled_event_types_are_skipped() {
        let envelope = EventEnvelope::builder()
            .aggregate_id(AggregateId::new())
            .aggregate_type("Todo")
            .event_type("LIST_RENAMED")
            .version(Version::first())
            .payload_raw(serde_json::json!({"type": "LIST_RENAMED", "payload": {}}))
            .build()
            .unwrap();

        let state = TodosViewModel
            .apply_envelope(TodosViewModel.init(), &envelope)
            .unwrap();
        assert!(state.is_empty());
    }

    #[tokio::test]
    async fn view_keeps_lists_apart() {
        let view = TodosView::new();
        let a = AggregateId::new();
        let b = AggregateId::new();

        view.handle(&make_envelope(a, 1, &TodoEvent::item_created("1", "a")))
            .await
            .unwrap();
        view.handle(&make_envelope(b, 1, &TodoEvent::item_created("1", "b")))
            .await
            .unwrap();
        view.handle(&make_envelope(a, 2, &TodoEvent::item_checked("1")))
            .await
            .unwrap();

        assert!(view.get_list(a).await.get(&id("1")).unwrap().checked);
        assert!(!view.get_list(b).await.get(&id("1")).unwrap().checked);
        assert_eq!(view.position().await.events_processed, 3);
        assert_eq!(ReadModel::count(&view), 2);
    }

    #[tokio::test]
    async fn unknown_list_reads_as_init() {
        let view = TodosView::new();
        assert!(view.get_list(AggregateId::new()).await.is_empty());
        assert_eq!(view.get_serialized(AggregateId::new()).await.unwrap(), "{}");
    }

    #[tokio::test]
    async fn other_aggregates_only_advance_position() {
        let view = TodosView::new();
        let envelope = EventEnvelope::builder()
            .aggregate_id(AggregateId::new())
            .aggregate_type("Calendar")
            .event_type("ITEM_CREATED")
            .version(Version::first())
            .payload_raw(serde_json::json!({"unrelated": true}))
            .build()
            .unwrap();

        view.handle(&envelope).await.unwrap();

        assert_eq!(view.position().await.events_processed, 1);
        assert!(view.list_ids().await.is_empty());
    }

    #[tokio::test]
    async fn undecodable_event_is_skipped_and_passed() {
        let view = TodosView::new();
        let list = AggregateId::new();
        let garbled = EventEnvelope::builder()
            .aggregate_id(list)
            .aggregate_type("Todo")
            .event_type("ITEM_CHECKED")
            .version(Version::first())
            .payload_raw(serde_json::json!({"type": "ITEM_CHECKED", "payload": 42}))
            .build()
            .unwrap();

        view.handle(&garbled).await.unwrap();
        view.handle(&make_envelope(list, 2, &TodoEvent::item_created("1", "a")))
            .await
            .unwrap();

        assert_eq!(view.position().await.events_processed, 2);
        assert_eq!(view.get_list(list).await.get(&id("1")), Some(&TodoEntry::new("a")));
    }

    #[tokio::test]
    async fn reset_clears_lists() {
        let view = TodosView::new();
        let list = AggregateId::new();
        view.handle(&make_envelope(list, 1, &TodoEvent::item_created("1", "a")))
            .await
            .unwrap();

        view.reset().await.unwrap();

        assert!(view.get_all().await.is_empty());
        assert_eq!(view.position().await, ProjectionPosition::zero());
    }
}

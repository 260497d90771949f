//! Todo domain events.

use common::ItemId;
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

/// Events recorded on a todo list.
///
/// Serialized as `{"type": "ITEM_CREATED", "payload": {...}}`; this is also
/// the envelope payload stored in the event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TodoEvent {
    ItemCreated(ItemCreatedData),
    ItemChecked(ItemCheckedData),
    ItemUnchecked(ItemUncheckedData),
    ItemRemoved(ItemRemovedData),
}

impl DomainEvent for TodoEvent {
    fn event_type(&self) -> &'static str {
        match self {
            TodoEvent::ItemCreated(_) => TodoEvent::ITEM_CREATED,
            TodoEvent::ItemChecked(_) => TodoEvent::ITEM_CHECKED,
            TodoEvent::ItemUnchecked(_) => TodoEvent::ITEM_UNCHECKED,
            TodoEvent::ItemRemoved(_) => TodoEvent::ITEM_REMOVED,
        }
    }
}

impl TodoEvent {
    pub const ITEM_CREATED: &'static str = "ITEM_CREATED";
    pub const ITEM_CHECKED: &'static str = "ITEM_CHECKED";
    pub const ITEM_UNCHECKED: &'static str = "ITEM_UNCHECKED";
    pub const ITEM_REMOVED: &'static str = "ITEM_REMOVED";

    pub fn item_created(id: impl Into<ItemId>, text: impl Into<String>) -> Self {
        TodoEvent::ItemCreated(ItemCreatedData {
            id: id.into(),
            text: text.into(),
        })
    }

    pub fn item_checked(id: impl Into<ItemId>) -> Self {
        TodoEvent::ItemChecked(ItemCheckedData { id: id.into() })
    }

    pub fn item_unchecked(id: impl Into<ItemId>) -> Self {
        TodoEvent::ItemUnchecked(ItemUncheckedData { id: id.into() })
    }

    pub fn item_removed(id: impl Into<ItemId>) -> Self {
        TodoEvent::ItemRemoved(ItemRemovedData { id: id.into() })
    }

    /// The item the event concerns.
    pub fn item_id(&self) -> &ItemId {
        match self {
            TodoEvent::ItemCreated(e) => &e.id,
            TodoEvent::ItemChecked(e) => &e.id,
            TodoEvent::ItemUnchecked(e) => &e.id,
            TodoEvent::ItemRemoved(e) => &e.id,
        }
    }
}

/// Data for ITEM_CREATED.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCreatedData {
    pub id: ItemId,
    pub text: String,
}

/// Data for ITEM_CHECKED.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCheckedData {
    pub id: ItemId,
}

/// Data for ITEM_UNCHECKED.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemUncheckedData {
    pub id: ItemId,
}

/// Data for ITEM_REMOVED.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRemovedData {
    pub id: ItemId,
}

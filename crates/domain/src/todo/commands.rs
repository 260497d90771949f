//! Todo commands.

use common::{AggregateId, ItemId};
use serde::{Deserialize, Serialize};

use crate::command::Command;

use super::{Todo, TodoError};

/// Commands accepted by the Todo aggregate.
///
/// Serialized as `{"type": "createItem", "payload": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum TodoCommand {
    CreateItem(CreateItem),
    CheckItem(CheckItem),
    UncheckItem(UncheckItem),
    RemoveItem(RemoveItem),
}

/// Adds an item to the list. Empty text is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateItem {
    pub id: ItemId,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckItem {
    pub id: ItemId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UncheckItem {
    pub id: ItemId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveItem {
    pub id: ItemId,
}

impl TodoCommand {
    /// Wire names of every command, in declaration order.
    pub const TYPES: [&'static str; 4] = ["createItem", "checkItem", "uncheckItem", "removeItem"];

    pub fn create_item(id: impl Into<ItemId>, text: impl Into<String>) -> Self {
        TodoCommand::CreateItem(CreateItem {
            id: id.into(),
            text: text.into(),
        })
    }

    pub fn check_item(id: impl Into<ItemId>) -> Self {
        TodoCommand::CheckItem(CheckItem { id: id.into() })
    }

    pub fn uncheck_item(id: impl Into<ItemId>) -> Self {
        TodoCommand::UncheckItem(UncheckItem { id: id.into() })
    }

    pub fn remove_item(id: impl Into<ItemId>) -> Self {
        TodoCommand::RemoveItem(RemoveItem { id: id.into() })
    }

    pub fn command_type(&self) -> &'static str {
        match self {
            TodoCommand::CreateItem(_) => "createItem",
            TodoCommand::CheckItem(_) => "checkItem",
            TodoCommand::UncheckItem(_) => "uncheckItem",
            TodoCommand::RemoveItem(_) => "removeItem",
        }
    }

    /// The item the command targets.
    pub fn item_id(&self) -> &ItemId {
        match self {
            TodoCommand::CreateItem(c) => &c.id,
            TodoCommand::CheckItem(c) => &c.id,
            TodoCommand::UncheckItem(c) => &c.id,
            TodoCommand::RemoveItem(c) => &c.id,
        }
    }

    /// Decodes an untyped `{type, payload}` pair.
    ///
    /// Unrecognized types yield [`TodoError::UnknownCommand`]; payloads
    /// with missing or mistyped fields yield [`TodoError::MalformedPayload`].
    /// Extra payload fields are ignored.
    pub fn from_parts(command_type: &str, payload: serde_json::Value) -> Result<Self, TodoError> {
        if !Self::TYPES.contains(&command_type) {
            return Err(TodoError::UnknownCommand {
                command_type: command_type.to_string(),
            });
        }

        let tagged = serde_json::json!({ "type": command_type, "payload": payload });
        serde_json::from_value(tagged).map_err(|e| TodoError::MalformedPayload {
            command_type: command_type.to_string(),
            reason: e.to_string(),
        })
    }
}

/// A [`TodoCommand`] addressed to one todo list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchCommand {
    pub aggregate_id: AggregateId,
    pub command: TodoCommand,
}

impl DispatchCommand {
    pub fn new(aggregate_id: AggregateId, command: TodoCommand) -> Self {
        Self {
            aggregate_id,
            command,
        }
    }
}

impl Command for DispatchCommand {
    type Aggregate = Todo;

    fn aggregate_id(&self) -> AggregateId {
        self.aggregate_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_format_is_tagged() {
        let cmd = TodoCommand::create_item("1", "Buy milk");
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(
            json,
            json!({"type": "createItem", "payload": {"id": "1", "text": "Buy milk"}})
        );

        let json = serde_json::to_value(TodoCommand::uncheck_item("7")).unwrap();
        assert_eq!(json, json!({"type": "uncheckItem", "payload": {"id": "7"}}));
    }

    #[test]
    fn command_type_matches_wire_tag() {
        let commands = [
            TodoCommand::create_item("1", "a"),
            TodoCommand::check_item("1"),
            TodoCommand::uncheck_item("1"),
            TodoCommand::remove_item("1"),
        ];
        for (cmd, expected) in commands.iter().zip(TodoCommand::TYPES) {
            assert_eq!(cmd.command_type(), expected);
            assert_eq!(serde_json::to_value(cmd).unwrap()["type"], expected);
        }
    }

    #[test]
    fn from_parts_decodes_each_type() {
        let cmd = TodoCommand::from_parts("createItem", json!({"id": "1", "text": ""})).unwrap();
        assert_eq!(cmd, TodoCommand::create_item("1", ""));

        let cmd = TodoCommand::from_parts("removeItem", json!({"id": "x"})).unwrap();
        assert_eq!(cmd, TodoCommand::remove_item("x"));
        assert_eq!(cmd.item_id().as_str(), "x");
    }

    #[test]
    fn from_parts_ignores_extra_fields() {
        let cmd =
            TodoCommand::from_parts("checkItem", json!({"id": "1", "text": "ignored"})).unwrap();
        assert_eq!(cmd, TodoCommand::check_item("1"));
    }

    #[test]
    fn from_parts_rejects_unknown_type() {
        let err = TodoCommand::from_parts("renameItem", json!({"id": "1"})).unwrap_err();
        assert_eq!(
            err,
            TodoError::UnknownCommand {
                command_type: "renameItem".to_string()
            }
        );
    }

    #[test]
    fn from_parts_rejects_missing_and_mistyped_fields() {
        let err = TodoCommand::from_parts("createItem", json!({"id": "1"})).unwrap_err();
        assert!(matches!(err, TodoError::MalformedPayload { ref command_type, .. } if command_type == "createItem"));

        let err = TodoCommand::from_parts("checkItem", json!({"id": 42})).unwrap_err();
        assert!(matches!(err, TodoError::MalformedPayload { .. }));

        let err = TodoCommand::from_parts("removeItem", serde_json::Value::Null).unwrap_err();
        assert!(matches!(err, TodoError::MalformedPayload { .. }));
    }

    #[test]
    fn dispatch_command_addresses_list() {
        let list = AggregateId::new();
        let dispatch = DispatchCommand::new(list, TodoCommand::check_item("1"));
        assert_eq!(dispatch.aggregate_id(), list);
    }
}

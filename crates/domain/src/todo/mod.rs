//! Todo list aggregate.

mod aggregate;
mod commands;
mod events;
mod service;

pub use aggregate::Todo;
pub use commands::{CheckItem, CreateItem, DispatchCommand, RemoveItem, TodoCommand, UncheckItem};
pub use events::{ItemCheckedData, ItemCreatedData, ItemRemovedData, ItemUncheckedData, TodoEvent};
pub use service::TodoService;

use thiserror::Error;

/// Rejections raised while turning a request into a Todo command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TodoError {
    /// The command type is not one the Todo aggregate handles.
    #[error("Unknown command type: {command_type}")]
    UnknownCommand { command_type: String },

    /// The payload is missing fields or has fields of the wrong type.
    #[error("Malformed payload for {command_type}: {reason}")]
    MalformedPayload {
        command_type: String,
        reason: String,
    },
}

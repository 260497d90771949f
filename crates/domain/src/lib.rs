//! Domain layer for the todo service.
//!
//! - [`Aggregate`] and [`DomainEvent`] traits for event-sourced entities
//! - [`Command`] and [`CommandHandler`] for load / execute / append
//! - the [`Todo`] aggregate, its commands and events, and [`TodoService`]

pub mod aggregate;
pub mod command;
pub mod error;
pub mod todo;

pub use aggregate::{Aggregate, DomainEvent};
pub use command::{Command, CommandHandler, CommandResult};
pub use error::DomainError;
pub use todo::{
    CheckItem, CreateItem, DispatchCommand, ItemCheckedData, ItemCreatedData, ItemRemovedData,
    ItemUncheckedData, RemoveItem, Todo, TodoCommand, TodoError, TodoEvent, TodoService,
    UncheckItem,
};

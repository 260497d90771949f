//! Identifier types shared by every crate of the todo service.

mod types;

pub use types::{AggregateId, ItemId};

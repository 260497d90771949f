//! Read model views.

pub mod todos;

pub use todos::{TodoEntry, TodosState, TodosView, TodosViewModel};

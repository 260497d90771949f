//! Query side of the todo service.
//!
//! - [`ViewModel`]: a pure per-aggregate fold with text serialization,
//!   implemented by [`TodosViewModel`]
//! - [`ViewModelLoader`]: rebuilds a view model from its snapshot and the
//!   events after it, writing new snapshots as the log grows
//! - [`Projection`] and [`ProjectionProcessor`]: feed the event log, in
//!   order, into long-lived read models such as [`TodosView`]

pub mod error;
pub mod loader;
pub mod processor;
pub mod projection;
pub mod read_model;
pub mod view_model;
pub mod views;

pub use error::{ProjectionError, Result};
pub use loader::{DEFAULT_SNAPSHOT_INTERVAL, LoadedViewModel, ViewModelLoader};
pub use processor::ProjectionProcessor;
pub use projection::{Projection, ProjectionPosition};
pub use read_model::ReadModel;
pub use view_model::ViewModel;
pub use views::{TodoEntry, TodosState, TodosView, TodosViewModel};

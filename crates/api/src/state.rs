//! Shared application state.

use std::sync::Arc;

use domain::TodoService;
use event_store::EventStore;
use projections::{ProjectionProcessor, TodosView, TodosViewModel, ViewModelLoader};

/// State shared by all handlers.
pub struct AppState<S: EventStore> {
    pub todo_service: TodoService<S>,
    /// Snapshot-backed, on-demand Todos state per list.
    pub todos_loader: ViewModelLoader<S, TodosViewModel>,
    /// Todos state for every list, fed by `projection_processor`.
    pub todos_view: Arc<TodosView>,
    pub projection_processor: Arc<ProjectionProcessor<S>>,
}

impl<S: EventStore + Clone> AppState<S> {
    pub fn new(event_store: S, snapshot_interval: u64) -> Self {
        let todos_view = Arc::new(TodosView::new());

        let mut processor = ProjectionProcessor::new(event_store.clone());
        processor.register(Box::new(todos_view.as_ref().clone()));

        Self {
            todo_service: TodoService::new(event_store.clone()),
            todos_loader: ViewModelLoader::new(event_store, TodosViewModel)
                .with_snapshot_interval(snapshot_interval),
            todos_view,
            projection_processor: Arc::new(processor),
        }
    }
}

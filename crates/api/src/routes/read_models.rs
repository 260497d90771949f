//! Read model endpoints backed by the projection processor.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use event_store::EventStore;
use projections::TodosState;
use serde::Serialize;

use super::parse_aggregate_id;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSummary {
    pub aggregate_id: String,
    pub items: usize,
    pub checked: usize,
}

#[derive(Debug, Serialize)]
pub struct ListsResponse {
    pub lists: Vec<ListSummary>,
}

/// GET /api/read-models/todos: every known list with item counts.
#[tracing::instrument(skip(state))]
pub async fn list_todos<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<ListsResponse>, ApiError> {
    state.projection_processor.run_catch_up().await?;

    let mut lists: Vec<ListSummary> = state
        .todos_view
        .get_all()
        .await
        .into_iter()
        .map(|(id, list)| ListSummary {
            aggregate_id: id.to_string(),
            items: list.len(),
            checked: list.items().filter(|(_, entry)| entry.checked).count(),
        })
        .collect();
    lists.sort_by(|a, b| a.aggregate_id.cmp(&b.aggregate_id));

    Ok(Json(ListsResponse { lists }))
}

/// GET /api/read-models/todos/{aggregate_id}: Todos state of one list
/// after catching the projections up with the log.
#[tracing::instrument(skip(state))]
pub async fn get_todos<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<TodosState>, ApiError> {
    let aggregate_id = parse_aggregate_id(&id)?;
    state.projection_processor.run_catch_up().await?;

    Ok(Json(state.todos_view.get_list(aggregate_id).await))
}

//! View model query endpoint.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use event_store::EventStore;

use super::parse_aggregate_id;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/view-models/todos/{aggregate_id}: serialized Todos state of one
/// list, rebuilt from its latest snapshot and the events after it.
#[tracing::instrument(skip(state))]
pub async fn todos<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let aggregate_id = parse_aggregate_id(&id)?;
    let body = state.todos_loader.load_serialized(aggregate_id).await?;

    Ok(([(header::CONTENT_TYPE, "application/json")], body))
}

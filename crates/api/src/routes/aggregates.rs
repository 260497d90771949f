//! Event log endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use event_store::{EventEnvelope, EventStore};

use super::parse_aggregate_id;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/aggregates/{aggregate_id}/events: the list's events, oldest first.
#[tracing::instrument(skip(state))]
pub async fn events<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<EventEnvelope>>, ApiError> {
    let aggregate_id = parse_aggregate_id(&id)?;
    let events = state.todo_service.events(aggregate_id).await?;
    Ok(Json(events))
}

//! Health check endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use event_store::EventStore;
use projections::ReadModel;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub projections: usize,
    pub read_models: Vec<ReadModelHealth>,
}

#[derive(Serialize)]
pub struct ReadModelHealth {
    pub name: &'static str,
    pub entries: usize,
}

/// GET /health
pub async fn check<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<HealthResponse> {
    let view = state.todos_view.as_ref();
    Json(HealthResponse {
        status: "ok",
        projections: state.projection_processor.projection_count(),
        read_models: vec![ReadModelHealth {
            name: ReadModel::name(view),
            entries: view.count(),
        }],
    })
}

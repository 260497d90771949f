//! Command dispatch endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use chrono::{DateTime, Utc};
use domain::{Aggregate, DispatchCommand, Todo, TodoCommand};
use event_store::EventStore;
use serde::{Deserialize, Serialize};

use super::parse_aggregate_id;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandRequest {
    pub aggregate_id: String,
    pub aggregate_name: String,
    #[serde(rename = "type")]
    pub command_type: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResponse {
    pub aggregate_id: String,
    pub aggregate_version: i64,
    pub timestamp: DateTime<Utc>,
    /// The recorded event, `{"type": ..., "payload": ...}`.
    pub event: serde_json::Value,
}

/// POST /api/commands: decode, execute and persist one Todo command.
#[tracing::instrument(skip(state, body))]
pub async fn dispatch<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    body: Result<Json<CommandRequest>, JsonRejection>,
) -> Result<Json<CommandResponse>, ApiError> {
    let Json(req) = body?;

    if req.aggregate_name != Todo::aggregate_type() {
        return Err(ApiError::BadRequest(format!(
            "Unknown aggregate: {}",
            req.aggregate_name
        )));
    }
    let aggregate_id = parse_aggregate_id(&req.aggregate_id)?;
    let command = TodoCommand::from_parts(&req.command_type, req.payload)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let result = state
        .todo_service
        .dispatch(DispatchCommand::new(aggregate_id, command))
        .await?;

    let envelope = result
        .envelopes
        .into_iter()
        .next_back()
        .ok_or_else(|| ApiError::Internal("command recorded no event".to_string()))?;

    Ok(Json(CommandResponse {
        aggregate_id: envelope.aggregate_id.to_string(),
        aggregate_version: envelope.version.as_i64(),
        timestamp: envelope.timestamp,
        event: envelope.payload,
    }))
}

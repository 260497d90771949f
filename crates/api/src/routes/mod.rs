//! HTTP route handlers.

pub mod aggregates;
pub mod commands;
pub mod health;
pub mod metrics;
pub mod read_models;
pub mod view_models;

use common::AggregateId;

use crate::error::ApiError;

/// Parses a path segment into a list id.
pub(crate) fn parse_aggregate_id(raw: &str) -> Result<AggregateId, ApiError> {
    raw.parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid aggregate id {raw:?}: {e}")))
}

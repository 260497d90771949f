//! HTTP API for the todo service.
//!
//! Accepts Todo commands, serves the Todos view model and the raw event
//! log, and exposes health and Prometheus metrics endpoints. Requests are
//! traced through `tower-http`.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use event_store::EventStore;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::{Config, LogFormat};
pub use error::ApiError;
pub use state::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: EventStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check::<S>))
        .route("/api/commands", post(routes::commands::dispatch::<S>))
        .route(
            "/api/view-models/todos/{aggregate_id}",
            get(routes::view_models::todos::<S>),
        )
        .route(
            "/api/read-models/todos",
            get(routes::read_models::list_todos::<S>),
        )
        .route(
            "/api/read-models/todos/{aggregate_id}",
            get(routes::read_models::get_todos::<S>),
        )
        .route(
            "/api/aggregates/{aggregate_id}/events",
            get(routes::aggregates::events::<S>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates application state over `event_store` with the Todos projection
/// registered.
pub fn create_default_state<S: EventStore + Clone + 'static>(
    event_store: S,
    snapshot_interval: u64,
) -> Arc<AppState<S>> {
    Arc::new(AppState::new(event_store, snapshot_interval))
}

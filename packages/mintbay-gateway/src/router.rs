//! HTTP router setup.

use crate::handlers;
use crate::middleware;
use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/ready", get(handlers::ready))
        .route("/metrics", get(handlers::metrics))
        .route("/collections", get(handlers::collections))
        .route("/collections/{id}", get(handlers::collection))
        .route("/collections/{id}/stats", get(handlers::collection_stats))
        // Wildcard: locators such as data: URIs contain slashes.
        .route("/content/{*locator}", get(handlers::content))
        .route("/ledger/head", get(handlers::ledger_head))
        .route("/ledger/events", get(handlers::ledger_events))
        .route("/execute", post(handlers::execute))
        .layer(axum::middleware::from_fn(middleware::inject_request_id))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

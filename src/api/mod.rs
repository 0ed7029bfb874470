//! HTTP query API
//!
//! Read access to the stored catalog plus an on-demand refresh. Every route
//! answers JSON; failures carry an `{ "error": ... }` body.

mod error;
mod handlers;
mod params;

pub use error::ApiError;
pub use params::ListParams;

use crate::storage::SharedStorage;
use crate::sync::CycleRunner;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

/// Shared state for the API handlers
#[derive(Clone)]
pub struct AppState {
    pub runner: CycleRunner,
    pub storage: SharedStorage,
}

impl AppState {
    /// Builds state around a runner, reading from the runner's store
    pub fn new(runner: CycleRunner) -> Self {
        let storage = runner.storage().clone();
        Self { runner, storage }
    }
}

/// Builds the API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/api/items", get(handlers::list_items))
        .route("/api/items/:id", get(handlers::get_item))
        .route("/api/refresh", post(handlers::start_refresh))
        .route("/api/refresh/:id", get(handlers::refresh_status))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

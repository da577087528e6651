pub mod tags;
pub mod videos;

use axum::{Router, http::StatusCode, routing::get};
use std::sync::Arc;

use crate::AppState;

/// Build all routes for the API
pub fn build_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .merge(videos::routes())
        .merge(tags::routes())
}

async fn health() -> StatusCode {
    StatusCode::OK
}

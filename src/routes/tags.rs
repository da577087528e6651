//! Tag endpoints (/tags)

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use std::sync::Arc;

use crate::AppState;
use crate::domain::tags;
use crate::services::error::LogErr;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/tags", get(list_tags))
}

/// GET /tags - names of tags carried by published videos
async fn list_tags(State(state): State<Arc<AppState>>) -> Result<Json<Vec<String>>, StatusCode> {
    let names = tags::list_tags(&state.db).await.log_500("List tags error")?;
    Ok(Json(names))
}

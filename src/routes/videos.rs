//! Video endpoints (/videos, /videos/{id})

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, put},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;

use crate::AppState;
use crate::constants::DEFAULT_LANGUAGE;
use crate::domain::videos::{self, VideoUpdate};
use crate::language::Language;
use crate::models::Page;
use crate::pagination::{self, PageParams};
use crate::services::error::{LogErr, LogPageErr};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/videos", get(list_videos))
        .route("/videos/{id}", put(update_video))
        .route("/videos/{id}", delete(delete_video))
}

#[derive(Debug, Deserialize)]
struct VideoListQuery {
    keyword: Option<String>,
    tag: Option<String>,
    cursor: Option<String>,
    language: Option<String>,
    limit: Option<i64>,
}

/// GET /videos - one page of the catalog, keyword-searched when `keyword`
/// is present. `cursor` and `nextCursor` are ISO-8601 timestamps. An absent
/// `language` means `ko`, the catalog's primary locale; an unrecognized one
/// is a 400, never a fallback to another language's strategy.
async fn list_videos(
    State(state): State<Arc<AppState>>,
    Query(query): Query<VideoListQuery>,
) -> Result<Json<Page>, StatusCode> {
    let cursor = query
        .cursor
        .as_deref()
        .map(parse_cursor)
        .transpose()
        .log_status("Bad cursor", StatusCode::BAD_REQUEST)?;

    let language = match query.language.as_deref() {
        None => DEFAULT_LANGUAGE,
        Some(raw) => raw
            .parse::<Language>()
            .log_status("Bad language", StatusCode::BAD_REQUEST)?,
    };

    let params = PageParams {
        keyword: query.keyword,
        tag: query.tag,
        cursor,
        language,
        limit: query.limit,
    };

    let page = pagination::get_page(&state.db, &params)
        .await
        .log_page_err("List videos error")?;

    Ok(Json(page))
}

fn parse_cursor(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    Ok(DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoUpdateBody {
    url: String,
    title: String,
    image_url: String,
    aired_at: DateTime<Utc>,
    is_voice_only: bool,
    published: bool,
    tags: Vec<String>,
}

/// PUT /videos/{id} - administrative update of metadata and tag links
async fn update_video(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
    Json(body): Json<VideoUpdateBody>,
) -> Result<StatusCode, StatusCode> {
    let update = VideoUpdate {
        url: body.url,
        title: body.title,
        image_url: body.image_url,
        aired_at: body.aired_at,
        is_voice_only: body.is_voice_only,
        published: body.published,
        tags: body.tags,
    };

    let mut tx = state.db.begin().await.log_500("Begin transaction error")?;

    let found = videos::update_video(&mut *tx, &video_id, &update)
        .await
        .log_500("Update video error")?;
    if !found {
        return Err(StatusCode::NOT_FOUND);
    }

    tx.commit().await.log_500("Commit update video error")?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /videos/{id} - remove a video with its tag links and cues
async fn delete_video(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
) -> Result<StatusCode, StatusCode> {
    let mut tx = state.db.begin().await.log_500("Begin transaction error")?;

    let found = videos::delete_video(&mut *tx, &video_id)
        .await
        .log_500("Delete video error")?;
    if !found {
        return Err(StatusCode::NOT_FOUND);
    }

    tx.commit().await.log_500("Commit delete video error")?;
    Ok(StatusCode::NO_CONTENT)
}

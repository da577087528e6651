//! Single entry point reconciling keyword search with chronological listing.
//!
//! Without a keyword the request is a plain catalog listing; with a keyword
//! the cue-level matches are re-grouped into their parent videos. Both paths
//! page by `aired_at` strictly descending with the cursor being the oldest
//! `aired_at` on the previous page. Videos sharing an identical timestamp
//! are not disambiguated across page boundaries; the timestamp is the whole
//! cursor.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::constants::{DEFAULT_VIDEO_LIMIT, MAX_VIDEO_LIMIT};
use crate::domain;
use crate::language::Language;
use crate::models::Page;
use crate::page;

#[derive(Debug, Clone)]
pub struct PageParams {
    pub keyword: Option<String>,
    pub tag: Option<String>,
    pub cursor: Option<DateTime<Utc>>,
    pub language: Language,
    pub limit: Option<i64>,
}

#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("keyword must not be empty")]
    EmptyKeyword,
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// Fetch one page of videos. Tag filtering combined with a keyword is not
/// supported: when a keyword is present the tag is ignored.
pub async fn get_page(pool: &PgPool, params: &PageParams) -> Result<Page, PageError> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_VIDEO_LIMIT)
        .clamp(1, MAX_VIDEO_LIMIT);

    let keyword = match params.keyword.as_deref().map(str::trim) {
        Some("") => return Err(PageError::EmptyKeyword),
        other => other,
    };

    let Some(keyword) = keyword else {
        let rows =
            domain::videos::list_videos(pool, params.tag.as_deref(), params.cursor, limit + 1)
                .await?;
        return Ok(page::assemble(rows, limit));
    };

    let rows =
        domain::subtitles::search_videos(pool, keyword, params.language, params.cursor, limit + 1)
            .await?;
    let mut result = page::assemble(rows, limit);

    let ids: Vec<String> = result.videos.iter().map(|v| v.id.clone()).collect();
    if !ids.is_empty() {
        let cues = domain::subtitles::matching_cues(pool, keyword, params.language, &ids).await?;
        page::attach_cues(&mut result.videos, cues);
    }

    Ok(result)
}

//! Keyword search domain - published videos matched through their cues
//!
//! The cue-level match is re-grouped into videos in two steps: first select
//! the page of distinct videos with at least one matching cue, then fetch
//! every matching cue for exactly those videos. Both steps use the same
//! match predicate, picked by the language's strategy.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::language::{Language, MatchStrategy};
use crate::models::Video;
use crate::models::SubtitleCue;
use crate::subtitles::{CueRow, like_pattern};

use super::videos::VideoRow;

/// Distinct published videos (with tag sets) that have a cue in `language`
/// matching `keyword`, newest first, strictly before `cursor` when given.
/// Fetches up to `limit` videos; callers pass `limit + 1` to detect a next
/// page.
pub async fn search_videos(
    pool: &PgPool,
    keyword: &str,
    language: Language,
    cursor: Option<DateTime<Utc>>,
    limit: i64,
) -> Result<Vec<Video>, sqlx::Error> {
    let sql = match language.match_strategy() {
        MatchStrategy::TokenizedQuery => {
            r#"
            SELECT v.id, v.url, v.title, v.image_url, v.aired_at, v.is_voice_only,
                   v.published, ARRAY_AGG(t.name) AS tags
            FROM videos v
            LEFT JOIN video_tags vt ON v.id = vt.video_id
            LEFT JOIN tags t ON vt.tag_id = t.id
            WHERE v.published = TRUE
              AND ($2::timestamptz IS NULL OR v.aired_at < $2)
              AND EXISTS (
                    SELECT 1 FROM subtitles s
                    WHERE s.video_id = v.id AND s.language = $3
                      AND s.text_vector @@ plainto_tsquery('simple', $1))
            GROUP BY v.id
            ORDER BY v.aired_at DESC
            LIMIT $4
            "#
        }
        MatchStrategy::Containment => {
            r#"
            SELECT v.id, v.url, v.title, v.image_url, v.aired_at, v.is_voice_only,
                   v.published, ARRAY_AGG(t.name) AS tags
            FROM videos v
            LEFT JOIN video_tags vt ON v.id = vt.video_id
            LEFT JOIN tags t ON vt.tag_id = t.id
            WHERE v.published = TRUE
              AND ($2::timestamptz IS NULL OR v.aired_at < $2)
              AND EXISTS (
                    SELECT 1 FROM subtitles s
                    WHERE s.video_id = v.id AND s.language = $3
                      AND s.text LIKE $1 ESCAPE '\')
            GROUP BY v.id
            ORDER BY v.aired_at DESC
            LIMIT $4
            "#
        }
    };

    let keyword = match language.match_strategy() {
        MatchStrategy::TokenizedQuery => keyword.to_string(),
        MatchStrategy::Containment => like_pattern(keyword),
    };

    let rows: Vec<VideoRow> = sqlx::query_as(sql)
        .bind(&keyword)
        .bind(cursor)
        .bind(language.code())
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(Video::from).collect())
}

/// All matching cues for the given videos in `(video_id, start_time)` order.
/// Unlimited on purpose: a page's videos carry their full set of matches.
pub async fn matching_cues(
    pool: &PgPool,
    keyword: &str,
    language: Language,
    video_ids: &[String],
) -> Result<Vec<SubtitleCue>, sqlx::Error> {
    let sql = match language.match_strategy() {
        MatchStrategy::TokenizedQuery => {
            r#"
            SELECT video_id, language, start_time, end_time, text
            FROM subtitles
            WHERE video_id = ANY($2) AND language = $3
              AND text_vector @@ plainto_tsquery('simple', $1)
            ORDER BY video_id, start_time
            "#
        }
        MatchStrategy::Containment => {
            r#"
            SELECT video_id, language, start_time, end_time, text
            FROM subtitles
            WHERE video_id = ANY($2) AND language = $3
              AND text LIKE $1 ESCAPE '\'
            ORDER BY video_id, start_time
            "#
        }
    };

    let keyword = match language.match_strategy() {
        MatchStrategy::TokenizedQuery => keyword.to_string(),
        MatchStrategy::Containment => like_pattern(keyword),
    };

    let rows: Vec<CueRow> = sqlx::query_as(sql)
        .bind(&keyword)
        .bind(video_ids)
        .bind(language.code())
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().filter_map(CueRow::into_cue).collect())
}

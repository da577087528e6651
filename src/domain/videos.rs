//! Video catalog domain - DB queries for videos and their tag sets
//!
//! Read queries use the generic Executor pattern, allowing them to work with
//! both `&PgPool` (for standalone queries) and `&mut PgConnection` (for
//! transactions). Multi-statement writes take `&mut PgConnection` and are
//! run inside a transaction owned by the caller.

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgConnection, Postgres};

use crate::models::Video;

#[derive(Debug, sqlx::FromRow)]
pub struct VideoRow {
    pub id: String,
    pub url: String,
    pub title: String,
    pub image_url: String,
    pub aired_at: DateTime<Utc>,
    pub is_voice_only: bool,
    pub published: bool,
    // ARRAY_AGG over the left join yields [NULL] for untagged videos.
    pub tags: Vec<Option<String>>,
}

impl From<VideoRow> for Video {
    fn from(row: VideoRow) -> Self {
        Video {
            id: row.id,
            url: row.url,
            title: row.title,
            image_url: row.image_url,
            aired_at: row.aired_at,
            is_voice_only: row.is_voice_only,
            published: row.published,
            tags: row.tags.into_iter().flatten().collect(),
            subtitles: None,
        }
    }
}

/// List published videos ordered by `aired_at` descending, strictly before
/// `cursor` when supplied, optionally restricted to videos carrying `tag`.
/// Fetches up to `limit` rows; callers pass `limit + 1` to detect a next page.
pub async fn list_videos<'e, E>(
    executor: E,
    tag: Option<&str>,
    cursor: Option<DateTime<Utc>>,
    limit: i64,
) -> Result<Vec<Video>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let rows: Vec<VideoRow> = sqlx::query_as(
        r#"
        SELECT v.id, v.url, v.title, v.image_url, v.aired_at, v.is_voice_only,
               v.published, ARRAY_AGG(t.name) AS tags
        FROM videos v
        LEFT JOIN video_tags vt ON v.id = vt.video_id
        LEFT JOIN tags t ON vt.tag_id = t.id
        WHERE v.published = TRUE
          AND ($1::text IS NULL OR EXISTS (
                SELECT 1 FROM video_tags vt1
                JOIN tags t1 ON vt1.tag_id = t1.id
                WHERE vt1.video_id = v.id AND t1.name = $1))
          AND ($2::timestamptz IS NULL OR v.aired_at < $2)
        GROUP BY v.id
        ORDER BY v.aired_at DESC
        LIMIT $3
        "#,
    )
    .bind(tag)
    .bind(cursor)
    .bind(limit)
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(Video::from).collect())
}

/// Fields accepted by the administrative update path.
#[derive(Debug, Clone)]
pub struct VideoUpdate {
    pub url: String,
    pub title: String,
    pub image_url: String,
    pub aired_at: DateTime<Utc>,
    pub is_voice_only: bool,
    pub published: bool,
    pub tags: Vec<String>,
}

/// Update a video and replace its tag links. Caller owns the transaction.
/// Returns false when no video with that id exists.
pub async fn update_video(
    tx: &mut PgConnection,
    video_id: &str,
    update: &VideoUpdate,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE videos
        SET url = $2, title = $3, image_url = $4, aired_at = $5,
            is_voice_only = $6, published = $7
        WHERE id = $1
        "#,
    )
    .bind(video_id)
    .bind(&update.url)
    .bind(&update.title)
    .bind(&update.image_url)
    .bind(update.aired_at)
    .bind(update.is_voice_only)
    .bind(update.published)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(false);
    }

    sqlx::query("DELETE FROM video_tags WHERE video_id = $1")
        .bind(video_id)
        .execute(&mut *tx)
        .await?;

    if !update.tags.is_empty() {
        sqlx::query(
            r#"
            INSERT INTO tags (name)
            SELECT UNNEST($1::text[])
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(&update.tags)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO video_tags (video_id, tag_id)
            SELECT $1, id FROM tags WHERE name = ANY($2)
            "#,
        )
        .bind(video_id)
        .bind(&update.tags)
        .execute(&mut *tx)
        .await?;
    }

    Ok(true)
}

/// Delete a video with its tag links and subtitle cues. Caller owns the
/// transaction. Returns false when no video with that id exists.
pub async fn delete_video(tx: &mut PgConnection, video_id: &str) -> Result<bool, sqlx::Error> {
    sqlx::query("DELETE FROM video_tags WHERE video_id = $1")
        .bind(video_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM subtitles WHERE video_id = $1")
        .bind(video_id)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query("DELETE FROM videos WHERE id = $1")
        .bind(video_id)
        .execute(&mut *tx)
        .await?;

    Ok(result.rows_affected() > 0)
}

//! Tag domain - names of tags carried by at least one published video

use sqlx::{Executor, Postgres};

#[derive(Debug, sqlx::FromRow)]
struct TagRow {
    name: String,
}

/// List tag names that appear on published videos, ordered by name.
pub async fn list_tags<'e, E>(executor: E) -> Result<Vec<String>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let rows: Vec<TagRow> = sqlx::query_as(
        r#"
        SELECT t.name
        FROM tags t
        JOIN video_tags vt ON t.id = vt.tag_id
        JOIN videos v ON vt.video_id = v.id
        WHERE v.published = TRUE
        GROUP BY t.name
        ORDER BY t.name
        "#,
    )
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(|r| r.name).collect())
}

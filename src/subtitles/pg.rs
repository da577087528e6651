//! Relational subtitle backend.
//!
//! Cues live in the `subtitles` table; Tokenized Query runs against the
//! generated `text_vector` tsvector column ('simple' configuration, GIN
//! indexed), Containment Match scans the raw text with `LIKE`. The search
//! index structures are built after bulk migration, not before.

use std::collections::HashSet;

use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::constants::INGEST_BATCH_SIZE;
use crate::language::{Language, MatchStrategy};
use crate::models::SubtitleCue;
use crate::vtt::Cue;

use super::{CueRow, SubtitleIndex, like_pattern};

#[derive(Debug, Clone)]
pub struct PgSubtitleIndex {
    pool: PgPool,
}

impl PgSubtitleIndex {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the bare `subtitles` table. Search index structures are added
    /// separately by [`build_search_indexes`](Self::build_search_indexes) so
    /// bulk loads are not slowed down by incremental index maintenance.
    pub async fn init_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS subtitles (
                id SERIAL PRIMARY KEY,
                video_id TEXT NOT NULL,
                language TEXT NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL,
                text TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Add the tokenized column and indexes after a bulk load.
    pub async fn build_search_indexes(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            ALTER TABLE subtitles ADD COLUMN IF NOT EXISTS text_vector tsvector
            GENERATED ALWAYS AS (to_tsvector('simple', text)) STORED
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_subtitles_text_vector ON subtitles USING GIN (text_vector)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_subtitles_language ON subtitles (language)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

impl SubtitleIndex for PgSubtitleIndex {
    async fn query(
        &self,
        keyword: &str,
        language: Language,
    ) -> Result<Vec<SubtitleCue>, sqlx::Error> {
        let rows: Vec<CueRow> = match language.match_strategy() {
            MatchStrategy::TokenizedQuery => {
                sqlx::query_as(
                    r#"
                    SELECT video_id, language, start_time, end_time, text
                    FROM subtitles
                    WHERE text_vector @@ plainto_tsquery('simple', $1) AND language = $2
                    ORDER BY video_id, start_time
                    "#,
                )
                .bind(keyword)
                .bind(language.code())
                .fetch_all(&self.pool)
                .await?
            }
            MatchStrategy::Containment => {
                sqlx::query_as(
                    r#"
                    SELECT video_id, language, start_time, end_time, text
                    FROM subtitles
                    WHERE text LIKE $1 ESCAPE '\' AND language = $2
                    ORDER BY video_id, start_time
                    "#,
                )
                .bind(like_pattern(keyword))
                .bind(language.code())
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows.into_iter().filter_map(CueRow::into_cue).collect())
    }

    async fn ingest_batch(
        &self,
        video_id: &str,
        language: Language,
        cues: &[Cue],
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        for chunk in cues.chunks(INGEST_BATCH_SIZE) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO subtitles (video_id, language, start_time, end_time, text) ",
            );
            builder.push_values(chunk, |mut b, cue| {
                b.push_bind(video_id)
                    .push_bind(language.code())
                    .push_bind(&cue.start_time)
                    .push_bind(&cue.end_time)
                    .push_bind(&cue.text);
            });
            builder.build().execute(&mut *tx).await?;
        }

        tx.commit().await
    }

    async fn already_ingested(
        &self,
        video_id: &str,
        language: Language,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM subtitles WHERE video_id = $1 AND language = $2)",
        )
        .bind(video_id)
        .bind(language.code())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn ingested_pairs(&self) -> Result<HashSet<(String, Language)>, sqlx::Error> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT DISTINCT video_id, language FROM subtitles")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(video_id, code)| Some((video_id, code.parse::<Language>().ok()?)))
            .collect())
    }

    async fn count(&self) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM subtitles")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn fetch_batch(&self, limit: i64, offset: i64) -> Result<Vec<SubtitleCue>, sqlx::Error> {
        let rows: Vec<CueRow> = sqlx::query_as(
            r#"
            SELECT video_id, language, start_time, end_time, text
            FROM subtitles
            ORDER BY id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().filter_map(CueRow::into_cue).collect())
    }

    async fn insert_rows(&self, cues: &[SubtitleCue]) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        for chunk in cues.chunks(INGEST_BATCH_SIZE) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO subtitles (video_id, language, start_time, end_time, text) ",
            );
            builder.push_values(chunk, |mut b, cue| {
                b.push_bind(&cue.video_id)
                    .push_bind(cue.language.code())
                    .push_bind(&cue.start_time)
                    .push_bind(&cue.end_time)
                    .push_bind(&cue.text);
            });
            builder.build().execute(&mut *tx).await?;
        }

        tx.commit().await
    }
}

//! Embedded SQLite subtitle backend.
//!
//! The file-based index the catalog originally shipped with: a `subtitles`
//! table plus an FTS5 external-content table over the cue text. Tokenized
//! queries go through FTS5 `MATCH`; containment queries scan with `LIKE`.

use std::collections::HashSet;
use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite};

use crate::constants::INGEST_BATCH_SIZE;
use crate::language::{Language, MatchStrategy};
use crate::models::SubtitleCue;
use crate::vtt::Cue;

use super::{CueRow, SubtitleIndex, like_pattern};

#[derive(Debug, Clone)]
pub struct SqliteSubtitleIndex {
    pool: SqlitePool,
}

impl SqliteSubtitleIndex {
    /// Open (or create) the subtitle database file and ensure the schema.
    pub async fn open(path: &Path) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        let index = Self { pool };
        index.init_schema().await?;
        Ok(index)
    }

    /// In-memory database, one connection so every query sees the same data.
    pub async fn in_memory() -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        let index = Self { pool };
        index.init_schema().await?;
        Ok(index)
    }

    #[cfg(test)]
    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn init_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS subtitles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
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

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_subtitles_language ON subtitles (language)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            r#"
            CREATE VIRTUAL TABLE IF NOT EXISTS subtitle_search USING fts5(
                text,
                content='subtitles',
                content_rowid='id'
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

impl SubtitleIndex for SqliteSubtitleIndex {
    async fn query(
        &self,
        keyword: &str,
        language: Language,
    ) -> Result<Vec<SubtitleCue>, sqlx::Error> {
        let rows: Vec<CueRow> = match language.match_strategy() {
            MatchStrategy::TokenizedQuery => {
                sqlx::query_as(
                    r#"
                    SELECT s.video_id, s.language, s.start_time, s.end_time, s.text
                    FROM subtitle_search fts
                    JOIN subtitles s ON fts.rowid = s.id
                    WHERE fts.text MATCH ? AND s.language = ?
                    ORDER BY s.video_id, s.start_time
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
                    SELECT s.video_id, s.language, s.start_time, s.end_time, s.text
                    FROM subtitles s
                    WHERE s.text LIKE ? ESCAPE '\' AND s.language = ?
                    ORDER BY s.video_id, s.start_time
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
            let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
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

        // All rows for this pair are new, so this extends the FTS index
        // by exactly the inserted cues.
        sqlx::query(
            r#"
            INSERT INTO subtitle_search (rowid, text)
            SELECT id, text FROM subtitles WHERE video_id = ? AND language = ?
            "#,
        )
        .bind(video_id)
        .bind(language.code())
        .execute(&mut *tx)
        .await?;

        tx.commit().await
    }

    async fn already_ingested(
        &self,
        video_id: &str,
        language: Language,
    ) -> Result<bool, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM subtitles WHERE video_id = ? AND language = ?",
        )
        .bind(video_id)
        .bind(language.code())
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
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
            LIMIT ? OFFSET ?
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

        let (watermark,): (i64,) = sqlx::query_as("SELECT COALESCE(MAX(id), 0) FROM subtitles")
            .fetch_one(&mut *tx)
            .await?;

        for chunk in cues.chunks(INGEST_BATCH_SIZE) {
            let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
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

        sqlx::query(
            "INSERT INTO subtitle_search (rowid, text) SELECT id, text FROM subtitles WHERE id > ?",
        )
        .bind(watermark)
        .execute(&mut *tx)
        .await?;

        tx.commit().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cue(start: &str, text: &str) -> Cue {
        Cue {
            start_time: start.to_string(),
            end_time: "00:00:59.000".to_string(),
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn containment_matches_korean_substring() {
        let index = SqliteSubtitleIndex::in_memory().await.unwrap();
        index
            .ingest_batch(
                "v1",
                Language::Ko,
                &[cue("00:00:01.000", "오늘 날씨 좋다"), cue("00:00:05.000", "안녕하세요")],
            )
            .await
            .unwrap();

        let hits = index.query("날씨", Language::Ko).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].text, "오늘 날씨 좋다");
        assert_eq!(hits[0].language, Language::Ko);
    }

    #[tokio::test]
    async fn tokenized_matches_whole_words_only() {
        let index = SqliteSubtitleIndex::in_memory().await.unwrap();
        index
            .ingest_batch(
                "v1",
                Language::En,
                &[cue("00:00:01.000", "the weather is nice today")],
            )
            .await
            .unwrap();

        let hits = index.query("weather", Language::En).await.unwrap();
        assert_eq!(hits.len(), 1);

        // Partial token does not match on a word-boundary index.
        let hits = index.query("weath", Language::En).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn query_is_scoped_to_the_requested_language() {
        let index = SqliteSubtitleIndex::in_memory().await.unwrap();
        index
            .ingest_batch("v1", Language::En, &[cue("00:00:01.000", "hello world")])
            .await
            .unwrap();

        assert!(index.query("hello", Language::Ko).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn results_are_ordered_by_video_then_start_time() {
        let index = SqliteSubtitleIndex::in_memory().await.unwrap();
        index
            .ingest_batch(
                "v2",
                Language::Ko,
                &[cue("00:00:09.000", "비 온다"), cue("00:00:01.000", "비 많이 온다")],
            )
            .await
            .unwrap();
        index
            .ingest_batch("v1", Language::Ko, &[cue("00:00:05.000", "비 그쳤다")])
            .await
            .unwrap();

        let hits = index.query("비", Language::Ko).await.unwrap();
        let keys: Vec<(&str, &str)> = hits
            .iter()
            .map(|c| (c.video_id.as_str(), c.start_time.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("v1", "00:00:05.000"),
                ("v2", "00:00:01.000"),
                ("v2", "00:00:09.000"),
            ]
        );
    }

    #[tokio::test]
    async fn already_ingested_tracks_committed_pairs() {
        let index = SqliteSubtitleIndex::in_memory().await.unwrap();
        assert!(!index.already_ingested("v1", Language::Ko).await.unwrap());

        index
            .ingest_batch("v1", Language::Ko, &[cue("00:00:01.000", "안녕")])
            .await
            .unwrap();

        assert!(index.already_ingested("v1", Language::Ko).await.unwrap());
        assert!(!index.already_ingested("v1", Language::En).await.unwrap());

        let pairs = index.ingested_pairs().await.unwrap();
        assert_eq!(pairs.len(), 1);
        assert!(pairs.contains(&("v1".to_string(), Language::Ko)));
    }

    #[tokio::test]
    async fn failed_batch_rolls_back_and_leaves_other_pairs_intact() {
        let index = SqliteSubtitleIndex::in_memory().await.unwrap();
        index
            .ingest_batch("v1", Language::Ko, &[cue("00:00:01.000", "안녕하세요")])
            .await
            .unwrap();

        // Break the FTS table so the next batch fails after its row inserts
        // but before its transaction commits.
        sqlx::query("DROP TABLE subtitle_search")
            .execute(index.pool())
            .await
            .unwrap();

        let result = index
            .ingest_batch("v2", Language::Ko, &[cue("00:00:01.000", "실패할 배치")])
            .await;
        assert!(result.is_err());

        // Zero rows from the failed pair were persisted; the earlier pair
        // is untouched.
        assert!(!index.already_ingested("v2", Language::Ko).await.unwrap());
        assert!(index.already_ingested("v1", Language::Ko).await.unwrap());
        assert_eq!(index.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn no_results_is_an_empty_list_not_an_error() {
        let index = SqliteSubtitleIndex::in_memory().await.unwrap();
        index
            .ingest_batch("v1", Language::En, &[cue("00:00:01.000", "hello world")])
            .await
            .unwrap();

        assert!(index.query("absent", Language::En).await.unwrap().is_empty());
    }
}

//! Subtitle store: keyword match queries over persisted cues.
//!
//! Two interchangeable backends answer the same "match keyword in language"
//! capability: an embedded SQLite file with an FTS5 index, and the Postgres
//! `subtitles` table with a generated tsvector column. The one-time
//! migration utility is a batch copier between two implementations of this
//! trait, not a bespoke script.

pub mod pg;
pub mod sqlite;

use std::collections::HashSet;

use crate::language::Language;
use crate::models::SubtitleCue;
use crate::vtt::Cue;

pub use pg::PgSubtitleIndex;
pub use sqlite::SqliteSubtitleIndex;

pub trait SubtitleIndex {
    /// All cues whose text matches `keyword` under the language's match
    /// strategy, ordered by `(video_id, start_time)`. No matches is a valid
    /// empty list, distinct from a query error.
    fn query(
        &self,
        keyword: &str,
        language: Language,
    ) -> impl Future<Output = Result<Vec<SubtitleCue>, sqlx::Error>> + Send;

    /// Insert all cues for one `(video_id, language)` file, all-or-nothing.
    /// The caller guarantees the pair was not previously ingested.
    fn ingest_batch(
        &self,
        video_id: &str,
        language: Language,
        cues: &[Cue],
    ) -> impl Future<Output = Result<(), sqlx::Error>> + Send;

    /// Whether committed cues exist for this `(video_id, language)` pair.
    fn already_ingested(
        &self,
        video_id: &str,
        language: Language,
    ) -> impl Future<Output = Result<bool, sqlx::Error>> + Send;

    /// Every committed `(video_id, language)` pair; lets the ingestion
    /// pipeline compute the complement in one query.
    fn ingested_pairs(
        &self,
    ) -> impl Future<Output = Result<HashSet<(String, Language)>, sqlx::Error>> + Send;

    /// Total number of stored cues.
    fn count(&self) -> impl Future<Output = Result<i64, sqlx::Error>> + Send;

    /// One fixed-size page of cues in stable id order, for bulk migration.
    fn fetch_batch(
        &self,
        limit: i64,
        offset: i64,
    ) -> impl Future<Output = Result<Vec<SubtitleCue>, sqlx::Error>> + Send;

    /// Bulk-insert arbitrary rows in one transaction, for bulk migration.
    fn insert_rows(
        &self,
        cues: &[SubtitleCue],
    ) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
}

/// Cue row as stored; the language column is a plain code string.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct CueRow {
    pub video_id: String,
    pub language: String,
    pub start_time: String,
    pub end_time: String,
    pub text: String,
}

impl CueRow {
    /// Rows with a language code this build does not know are dropped.
    pub(crate) fn into_cue(self) -> Option<SubtitleCue> {
        let language = self.language.parse::<Language>().ok()?;
        Some(SubtitleCue {
            video_id: self.video_id,
            language,
            start_time: self.start_time,
            end_time: self.end_time,
            text: self.text,
        })
    }
}

/// LIKE pattern for containment matching, with `\`, `%` and `_` escaped.
pub(crate) fn like_pattern(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len() + 2);
    escaped.push('%');
    for c in keyword.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("날씨"), "%날씨%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }
}

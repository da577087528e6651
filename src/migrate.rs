//! One-time bulk migration between subtitle backends.
//!
//! Copies every cue from a source index into a target index in fixed-size
//! batches, each batch its own transaction. The copier works on any two
//! `SubtitleIndex` implementations; building the target's search index
//! structures afterward is the caller's job (deferred for load throughput).

use crate::constants::INGEST_BATCH_SIZE;
use crate::subtitles::SubtitleIndex;

#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    #[error("target store already holds {0} cues; refusing to migrate into it")]
    TargetNotEmpty(i64),
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// Copy all cues from `source` into `target`. Returns the number copied.
pub async fn copy_all<S, T>(source: &S, target: &T) -> Result<i64, MigrateError>
where
    S: SubtitleIndex,
    T: SubtitleIndex,
{
    let existing = target.count().await?;
    if existing > 0 {
        return Err(MigrateError::TargetNotEmpty(existing));
    }

    let total = source.count().await?;
    let batch_size = INGEST_BATCH_SIZE as i64;
    println!(
        "[migrate] copying {} cues in batches of {}",
        total, batch_size
    );

    let mut copied: i64 = 0;
    let mut offset: i64 = 0;
    while offset < total {
        let batch = source.fetch_batch(batch_size, offset).await?;
        // The offset walks the raw table. Rows the mapping layer drops
        // (unknown language codes) still advance it, or the next batch
        // would re-fetch cues that were already copied.
        offset += batch_size;
        if batch.is_empty() {
            continue;
        }
        target.insert_rows(&batch).await?;
        copied += batch.len() as i64;
        println!(
            "[migrate] {}/{} rows scanned, {} cues copied",
            offset.min(total),
            total,
            copied
        );
    }

    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;
    use crate::subtitles::{SqliteSubtitleIndex, SubtitleIndex};
    use crate::vtt::Cue;

    fn cue(n: u32, text: &str) -> Cue {
        Cue {
            start_time: format!("00:00:{n:02}.000"),
            end_time: format!("00:00:{:02}.000", n + 1),
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn copies_everything_and_queries_stay_equivalent() {
        let source = SqliteSubtitleIndex::in_memory().await.unwrap();
        source
            .ingest_batch(
                "v1",
                Language::Ko,
                &[cue(1, "오늘 날씨 좋다"), cue(5, "안녕하세요")],
            )
            .await
            .unwrap();
        source
            .ingest_batch("v2", Language::En, &[cue(2, "the weather is nice")])
            .await
            .unwrap();

        let target = SqliteSubtitleIndex::in_memory().await.unwrap();
        let copied = copy_all(&source, &target).await.unwrap();
        assert_eq!(copied, 3);
        assert_eq!(target.count().await.unwrap(), 3);

        // Same keyword, same language, same hits on either backend.
        let from_source = source.query("날씨", Language::Ko).await.unwrap();
        let from_target = target.query("날씨", Language::Ko).await.unwrap();
        assert_eq!(from_source, from_target);

        let from_target = target.query("weather", Language::En).await.unwrap();
        assert_eq!(from_target.len(), 1);
    }

    #[tokio::test]
    async fn unknown_language_rows_do_not_skew_batch_offsets() {
        let source = SqliteSubtitleIndex::in_memory().await.unwrap();

        // Enough cues to span two copy batches, each with unique text.
        let cues: Vec<Cue> = (0..INGEST_BATCH_SIZE + 500)
            .map(|i| cue(0, &format!("자막 {i:04}")))
            .collect();
        source.ingest_batch("v1", Language::Ko, &cues).await.unwrap();

        // A row inside the first batch that the mapping layer drops.
        sqlx::query("UPDATE subtitles SET language = 'fr' WHERE id = 500")
            .execute(source.pool())
            .await
            .unwrap();

        let target = SqliteSubtitleIndex::in_memory().await.unwrap();
        let copied = copy_all(&source, &target).await.unwrap();

        let expected = (INGEST_BATCH_SIZE + 500 - 1) as i64;
        assert_eq!(copied, expected);
        assert_eq!(target.count().await.unwrap(), expected);

        // The cue straddling the first batch boundary was copied once.
        let hits = target.query("자막 0999", Language::Ko).await.unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn refuses_a_non_empty_target() {
        let source = SqliteSubtitleIndex::in_memory().await.unwrap();
        source
            .ingest_batch("v1", Language::Ko, &[cue(1, "안녕")])
            .await
            .unwrap();

        let target = SqliteSubtitleIndex::in_memory().await.unwrap();
        target
            .ingest_batch("v9", Language::Ko, &[cue(1, "이미 있음")])
            .await
            .unwrap();

        let err = copy_all(&source, &target).await.unwrap_err();
        assert!(matches!(err, MigrateError::TargetNotEmpty(1)));
        assert_eq!(target.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn empty_source_copies_nothing() {
        let source = SqliteSubtitleIndex::in_memory().await.unwrap();
        let target = SqliteSubtitleIndex::in_memory().await.unwrap();
        assert_eq!(copy_all(&source, &target).await.unwrap(), 0);
    }
}

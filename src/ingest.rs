//! Subtitle ingestion pipeline.
//!
//! Walks a source directory for `<video_id>/<language>.vtt` files, computes
//! the set of already-ingested `(video_id, language)` pairs in one query,
//! then parses and batch-loads only the complement. Each file is its own
//! transaction: a failure rolls that file back, is logged, and the run
//! continues with the remaining files.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::constants::SUBTITLE_EXT;
use crate::subtitles::SubtitleIndex;
use crate::vtt;

/// Per-file outcomes of one pipeline run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Files loaded this run.
    pub ingested: usize,
    /// Files whose pair was already committed in the store.
    pub skipped_ingested: usize,
    /// Files skipped for bad naming or unparseable content.
    pub skipped_invalid: usize,
    /// Files whose batch insert failed and was rolled back.
    pub failed: usize,
}

/// Run the pipeline over every subtitle file under `root`.
///
/// Only errors that prevent the run itself (listing the ingested pairs)
/// surface as `Err`; per-file problems are logged and counted.
pub async fn run<S: SubtitleIndex>(index: &S, root: &Path) -> Result<IngestReport, sqlx::Error> {
    let files = discover_files(root);
    println!("[ingest] {} subtitle files under {}", files.len(), root.display());

    let ingested = index.ingested_pairs().await?;
    let mut report = IngestReport::default();

    for path in files {
        let meta = match vtt::extract_metadata(&path) {
            Ok(meta) => meta,
            Err(e) => {
                eprintln!("[ingest] skipping {}: {}", path.display(), e);
                report.skipped_invalid += 1;
                continue;
            }
        };

        if ingested.contains(&(meta.video_id.clone(), meta.language)) {
            report.skipped_ingested += 1;
            continue;
        }

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("[ingest] skipping {}: {}", path.display(), e);
                report.skipped_invalid += 1;
                continue;
            }
        };

        let cues = match vtt::parse(&content) {
            Ok(cues) => cues,
            Err(e) => {
                eprintln!("[ingest] skipping {}: {}", path.display(), e);
                report.skipped_invalid += 1;
                continue;
            }
        };

        match index.ingest_batch(&meta.video_id, meta.language, &cues).await {
            Ok(()) => {
                println!(
                    "[ingest] {}/{}: {} cues",
                    meta.video_id,
                    meta.language,
                    cues.len()
                );
                report.ingested += 1;
            }
            Err(e) => {
                eprintln!(
                    "[ingest] {}/{} failed, rolled back: {}",
                    meta.video_id, meta.language, e
                );
                report.failed += 1;
            }
        }
    }

    Ok(report)
}

fn discover_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some(SUBTITLE_EXT))
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;
    use crate::subtitles::SqliteSubtitleIndex;
    use std::fs;

    fn write_file(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    const GOOD_VTT: &str =
        "WEBVTT\n\n1\n00:00:01.000 --> 00:00:03.000\n오늘 날씨 좋다\n\n2\n00:00:04.000 --> 00:00:06.000\n안녕하세요\n";

    #[tokio::test]
    async fn ingests_new_files_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "ep-101/ko.vtt", GOOD_VTT);
        write_file(
            dir.path(),
            "ep-101/en.vtt",
            "WEBVTT\n\n00:00:01.000 --> 00:00:03.000\nthe weather is nice today\n",
        );

        let index = SqliteSubtitleIndex::in_memory().await.unwrap();

        let report = run(&index, dir.path()).await.unwrap();
        assert_eq!(report.ingested, 2);
        assert_eq!(report.skipped_ingested, 0);
        assert_eq!(index.count().await.unwrap(), 3);

        // Unchanged directory: second run inserts zero additional rows.
        let report = run(&index, dir.path()).await.unwrap();
        assert_eq!(report.ingested, 0);
        assert_eq!(report.skipped_ingested, 2);
        assert_eq!(index.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn malformed_and_misnamed_files_are_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "ep-101/ko.vtt", GOOD_VTT);
        // Unsupported language code in the filename.
        write_file(dir.path(), "ep-101/fr.vtt", GOOD_VTT);
        // No parseable time range.
        write_file(dir.path(), "ep-102/ko.vtt", "WEBVTT\n\nno cues here\n");
        // Half-open time range.
        write_file(dir.path(), "ep-103/ko.vtt", "00:00:01.000 -->\ntext\n");

        let index = SqliteSubtitleIndex::in_memory().await.unwrap();
        let report = run(&index, dir.path()).await.unwrap();

        assert_eq!(report.ingested, 1);
        assert_eq!(report.skipped_invalid, 3);
        assert_eq!(report.failed, 0);
        assert!(index.already_ingested("ep-101", Language::Ko).await.unwrap());
        assert!(!index.already_ingested("ep-102", Language::Ko).await.unwrap());
    }

    #[tokio::test]
    async fn insert_failures_are_rolled_back_counted_and_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "ep-101/ko.vtt", GOOD_VTT);
        write_file(dir.path(), "ep-102/ko.vtt", GOOD_VTT);

        let index = SqliteSubtitleIndex::in_memory().await.unwrap();
        // Make every batch insert fail mid-transaction.
        sqlx::query("DROP TABLE subtitle_search")
            .execute(index.pool())
            .await
            .unwrap();

        // The run still completes; each file's failure is isolated.
        let report = run(&index, dir.path()).await.unwrap();
        assert_eq!(report.failed, 2);
        assert_eq!(report.ingested, 0);
        assert_eq!(index.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn non_vtt_files_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "ep-101/ko.srt", GOOD_VTT);
        write_file(dir.path(), "README.md", "notes\n");

        let index = SqliteSubtitleIndex::in_memory().await.unwrap();
        let report = run(&index, dir.path()).await.unwrap();
        assert_eq!(report, IngestReport::default());
    }
}

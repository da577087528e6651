//! Subtitle ingestion batch job.
//!
//! Scans `SUBTITLES_DIR` (default `data/subtitles`) for
//! `<video_id>/<language>.vtt` files and loads the ones whose
//! `(video_id, language)` pair is not yet in the relational store.
//! Per-file failures are logged and do not fail the run.

use std::path::PathBuf;
use std::process::ExitCode;

use catalog::ingest;
use catalog::services::db;
use catalog::subtitles::PgSubtitleIndex;

#[tokio::main]
async fn main() -> ExitCode {
    let root = PathBuf::from(
        std::env::var("SUBTITLES_DIR").unwrap_or_else(|_| "data/subtitles".to_string()),
    );

    let pool = match db::connect(&db::database_url_from_env()).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("[ingest] failed to connect to database: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let index = PgSubtitleIndex::new(pool);

    match ingest::run(&index, &root).await {
        Ok(report) => {
            println!(
                "[ingest] done: {} ingested, {} already present, {} invalid, {} failed",
                report.ingested, report.skipped_ingested, report.skipped_invalid, report.failed
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("[ingest] run aborted: {}", e);
            ExitCode::FAILURE
        }
    }
}

//! One-time copy of the embedded SQLite subtitle index into Postgres.
//!
//! Reads `SUBTITLE_DB_PATH` (default `data/subtitles.db`), bulk-copies every
//! cue into the relational store in fixed-size batches, then builds the
//! text-search index structures. Refuses to run against a non-empty target.

use std::path::PathBuf;
use std::process::ExitCode;

use catalog::migrate;
use catalog::services::db;
use catalog::subtitles::{PgSubtitleIndex, SqliteSubtitleIndex};

#[tokio::main]
async fn main() -> ExitCode {
    let sqlite_path = PathBuf::from(
        std::env::var("SUBTITLE_DB_PATH").unwrap_or_else(|_| "data/subtitles.db".to_string()),
    );

    let source = match SqliteSubtitleIndex::open(&sqlite_path).await {
        Ok(source) => source,
        Err(e) => {
            eprintln!(
                "[migrate] failed to open {}: {}",
                sqlite_path.display(),
                e
            );
            return ExitCode::FAILURE;
        }
    };

    let pool = match db::connect(&db::database_url_from_env()).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("[migrate] failed to connect to database: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let target = PgSubtitleIndex::new(pool);
    if let Err(e) = target.init_schema().await {
        eprintln!("[migrate] failed to create schema: {}", e);
        return ExitCode::FAILURE;
    }

    let copied = match migrate::copy_all(&source, &target).await {
        Ok(copied) => copied,
        Err(e) => {
            eprintln!("[migrate] aborted: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Index build is deferred until after the bulk load for throughput.
    if let Err(e) = target.build_search_indexes().await {
        eprintln!("[migrate] failed to build search indexes: {}", e);
        return ExitCode::FAILURE;
    }

    println!("[migrate] done: {} cues copied", copied);
    ExitCode::SUCCESS
}

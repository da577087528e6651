//! Locale-aware video catalog with subtitle full-text search.
//!
//! The catalog lives in Postgres; subtitle cues are searchable through two
//! interchangeable backends (embedded SQLite FTS5 and the relational
//! tsvector column). `pagination::get_page` is the single entry point that
//! merges keyword search with the chronological tag/browse listing.

pub mod constants;
pub mod domain;
pub mod ingest;
pub mod language;
pub mod migrate;
pub mod models;
pub mod page;
pub mod pagination;
pub mod routes;
pub mod services;
pub mod subtitles;
pub mod vtt;

use sqlx::PgPool;

/// Shared state injected into every route handler.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
}

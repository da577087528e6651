//! Application constants

use crate::language::Language;

/// Subtitle language assumed when a caller names none; the catalog's
/// primary locale.
pub const DEFAULT_LANGUAGE: Language = Language::Ko;

/// Default page size for the paginated video listing
pub const DEFAULT_VIDEO_LIMIT: i64 = 12;

/// Maximum page size accepted from callers
pub const MAX_VIDEO_LIMIT: i64 = 50;

/// Maximum cues inserted per statement during ingestion and migration
pub const INGEST_BATCH_SIZE: usize = 1000;

/// Subtitle source file extension recognized by the ingestion pipeline
pub const SUBTITLE_EXT: &str = "vtt";

//! Shared data models used across modules

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::language::Language;

/// A catalog video with its aggregated tag set. Subtitle cues are attached
/// only on keyword search results.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: String,
    pub url: String,
    pub title: String,
    pub image_url: String,
    pub aired_at: DateTime<Utc>,
    pub is_voice_only: bool,
    pub published: bool,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitles: Option<Vec<SubtitleCue>>,
}

/// A single timestamped block of subtitle text. Timecodes are cue-local
/// (`"00:01:02.500"`), not absolute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtitleCue {
    pub video_id: String,
    pub language: Language,
    pub start_time: String,
    pub end_time: String,
    pub text: String,
}

/// One page of videos plus the cursor for the next page. The cursor is the
/// `aired_at` of the last (oldest) video returned, or null on the last page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub videos: Vec<Video>,
    pub next_cursor: Option<DateTime<Utc>>,
    pub has_more: bool,
}

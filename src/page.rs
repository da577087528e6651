//! Pure page assembly: trimming the over-fetched row, computing the next
//! cursor and has-more flag, and grouping matched cues under their videos.
//!
//! Kept free of storage so the pagination invariants are unit-testable.

use std::collections::HashMap;

use crate::models::{Page, SubtitleCue, Video};

/// Assemble a page from rows fetched with `limit + 1`. Rows must already be
/// ordered `aired_at` descending. `next_cursor` is the `aired_at` of the
/// last returned (oldest) video, null when there is no further page.
pub fn assemble(mut videos: Vec<Video>, limit: i64) -> Page {
    let has_more = videos.len() as i64 > limit;
    videos.truncate(limit.max(0) as usize);

    let next_cursor = if has_more {
        videos.last().map(|v| v.aired_at)
    } else {
        None
    };

    Page {
        videos,
        next_cursor,
        has_more,
    }
}

/// Attach matched cues to their parent videos, preserving the cue order the
/// store returned (`video_id`, then `start_time`). Every video on a keyword
/// page gets a cue list, never `None`.
pub fn attach_cues(videos: &mut [Video], cues: Vec<SubtitleCue>) {
    let mut by_video: HashMap<String, Vec<SubtitleCue>> = HashMap::new();
    for cue in cues {
        by_video.entry(cue.video_id.clone()).or_default().push(cue);
    }

    for video in videos {
        video.subtitles = Some(by_video.remove(&video.id).unwrap_or_default());
    }
}

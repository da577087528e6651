//! WebVTT parser for subtitle source files.
//!
//! Line-oriented state machine: skip header/blank/sequence lines, open a cue
//! on a `-->` time-range line, accumulate text lines until the next cue
//! header or end of input. Multi-line cue text is joined with single spaces.

use std::path::Path;

use crate::language::Language;

/// A parsed cue before it is bound to a video/language pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    pub start_time: String,
    pub end_time: String,
    pub text: String,
}

/// `(video_id, language)` recovered from a source path of the form
/// `<video_id>/<language>.vtt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    pub video_id: String,
    pub language: Language,
}

#[derive(Debug, thiserror::Error)]
pub enum VttError {
    #[error("malformed time range line: {0}")]
    MalformedTimeRange(String),
    #[error("no cues found")]
    NoCues,
    #[error("path does not encode <video_id>/<language>.vtt: {0}")]
    BadPath(String),
}

/// Extract `(video_id, language)` from the source path. The parent directory
/// is the video id and the file stem is the language code.
pub fn extract_metadata(path: &Path) -> Result<FileMetadata, VttError> {
    let bad = || VttError::BadPath(path.display().to_string());

    if path.extension().and_then(|e| e.to_str()) != Some(crate::constants::SUBTITLE_EXT) {
        return Err(bad());
    }

    let language = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(bad)?
        .parse::<Language>()
        .map_err(|_| bad())?;

    let video_id = path
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(bad)?
        .to_string();

    Ok(FileMetadata { video_id, language })
}

/// Parse WebVTT content into cues. An open cue is flushed when a new time
/// range line appears or at end of input.
pub fn parse(content: &str) -> Result<Vec<Cue>, VttError> {
    let mut cues = Vec::new();
    let mut open: Option<(String, String)> = None;
    let mut collecting = false;
    let mut text = String::new();

    for raw in content.lines() {
        let line = raw.trim();

        if line == "WEBVTT" || line.is_empty() || is_sequence_number(line) {
            continue;
        }

        if line.contains("-->") {
            if let Some((start, end)) = open.take() {
                cues.push(Cue {
                    start_time: start,
                    end_time: end,
                    text: std::mem::take(&mut text).trim().to_string(),
                });
            }
            open = Some(parse_time_range(line)?);
            collecting = true;
        } else if collecting {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(line);
        }
    }

    if let Some((start, end)) = open {
        let text = text.trim();
        if !text.is_empty() {
            cues.push(Cue {
                start_time: start,
                end_time: end,
                text: text.to_string(),
            });
        }
    }

    if cues.is_empty() {
        return Err(VttError::NoCues);
    }

    Ok(cues)
}

fn is_sequence_number(line: &str) -> bool {
    !line.is_empty() && line.bytes().all(|b| b.is_ascii_digit())
}

fn parse_time_range(line: &str) -> Result<(String, String), VttError> {
    let (start, end) = line
        .split_once("-->")
        .ok_or_else(|| VttError::MalformedTimeRange(line.to_string()))?;

    let start = start.trim();
    // Cue settings after the end timestamp are not part of the timecode.
    let end = end
        .trim()
        .split_whitespace()
        .next()
        .unwrap_or_default();

    if start.is_empty() || end.is_empty() {
        return Err(VttError::MalformedTimeRange(line.to_string()));
    }

    Ok((start.to_string(), end.to_string()))
}

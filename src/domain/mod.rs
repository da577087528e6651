pub mod subtitles;
pub mod tags;
pub mod videos;

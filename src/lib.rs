//! tubefetch - extract the best audio and video streams from a video-sharing URL
//!
//! This library resolves a URL through an external platform client (yt-dlp),
//! picks one audio-only stream and one progressive mp4 stream, saves both to
//! disk and serves them back through a small web front end.

pub mod cli;
pub mod config;
pub mod extractors;
pub mod service;
pub mod utils;
pub mod web;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use extractors::{PlatformClient, StreamInfo, VideoInfo};
pub use service::{ExtractionService, StreamSelection};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Which of the two stored media kinds a stream or file belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Audio,
    Video,
}

impl StreamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamKind::Audio => "audio",
            StreamKind::Video => "video",
        }
    }

    /// Parse the `kind` segment of a download URL. Only exact matches are accepted.
    pub fn from_path_segment(segment: &str) -> Option<Self> {
        match segment {
            "audio" => Some(StreamKind::Audio),
            "video" => Some(StreamKind::Video),
            _ => None,
        }
    }
}

impl std::fmt::Display for StreamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by [`ExtractionService::resolve`]
#[derive(thiserror::Error, Debug)]
pub enum ExtractionError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No suitable {0} stream found")]
    NotFound(StreamKind),

    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),
}

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub mod selector;
pub mod youtube;

pub use selector::{select_audio, select_video};
pub use youtube::YtDlpClient;

use crate::utils::{sanitize_filename, truncate_utf8, MAX_FILENAME_BYTES};
use crate::Result;

/// Metadata for a single video page as reported by the platform client
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoInfo {
    /// Platform identifier of the video
    #[serde(default)]
    pub id: String,

    /// Human readable title, used to name saved files
    #[serde(default)]
    pub title: String,

    /// Every stream the platform offers for this video
    #[serde(default, rename = "formats")]
    pub streams: Vec<StreamInfo>,
}

/// One downloadable stream (a "format" in yt-dlp terms)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamInfo {
    pub format_id: String,

    /// Direct media URL
    #[serde(default)]
    pub url: String,

    /// Container extension (mp4, m4a, webm, ...)
    #[serde(default)]
    pub ext: String,

    /// Transfer protocol; `None` is treated as plain HTTP(S)
    #[serde(default)]
    pub protocol: Option<String>,

    /// Video codec, `"none"` for audio-only streams
    #[serde(default)]
    pub vcodec: Option<String>,

    /// Audio codec, `"none"` for video-only streams
    #[serde(default)]
    pub acodec: Option<String>,

    /// Average audio bitrate in kbps
    #[serde(default)]
    pub abr: Option<f64>,

    /// Total bitrate in kbps
    #[serde(default)]
    pub tbr: Option<f64>,

    /// Vertical resolution in pixels
    #[serde(default)]
    pub height: Option<u32>,

    /// File size in bytes if known
    #[serde(default)]
    pub filesize: Option<u64>,

    /// Headers the platform expects on the media request
    #[serde(default)]
    pub http_headers: HashMap<String, String>,
}

fn codec_present(codec: Option<&str>) -> bool {
    matches!(codec, Some(value) if value != "none" && !value.is_empty())
}

impl StreamInfo {
    pub fn has_video(&self) -> bool {
        codec_present(self.vcodec.as_deref())
    }

    pub fn has_audio(&self) -> bool {
        codec_present(self.acodec.as_deref())
    }

    /// Audio without a video track
    pub fn is_audio_only(&self) -> bool {
        self.has_audio() && !self.has_video()
    }

    /// Audio and video multiplexed in a single file
    pub fn is_progressive(&self) -> bool {
        self.has_audio() && self.has_video()
    }

    /// Whether the stream can be fetched with a single HTTP GET
    pub fn is_direct(&self) -> bool {
        !self.url.is_empty()
            && matches!(self.protocol.as_deref(), None | Some("http") | Some("https"))
    }

    /// Bitrate used for ranking audio streams
    pub fn bitrate(&self) -> Option<f64> {
        self.abr.or(self.tbr).filter(|rate| *rate > 0.0)
    }

    /// Resolution used for ranking video streams
    pub fn resolution(&self) -> Option<u32> {
        self.height
    }
}

/// File name a stream is stored under: the sanitized title plus the container extension.
pub fn stored_file_name(info: &VideoInfo, stream: &StreamInfo) -> String {
    let mut stem = sanitize_filename(&info.title);
    if stem.is_empty() {
        stem = sanitize_filename(&stream.format_id);
    }
    if stem.is_empty() {
        stem = "download".to_string();
    }

    let ext = sanitize_filename(&stream.ext);
    if ext.is_empty() {
        return stem;
    }

    // leave room for ".ext" under NAME_MAX
    let budget = MAX_FILENAME_BYTES.saturating_sub(ext.len() + 1);
    let stem = sanitize_filename(truncate_utf8(&stem, budget));
    format!("{}.{}", stem, ext)
}

/// Client for a video platform: enumerate streams, then save one of them
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Resolve a page URL into its title and stream list
    async fn fetch_info(&self, url: &str) -> Result<VideoInfo>;

    /// Save `stream` into `dest_dir` and return the path of the written file
    async fn download(&self, info: &VideoInfo, stream: &StreamInfo, dest_dir: &Path)
        -> Result<PathBuf>;

    /// Get the name of this platform client
    fn platform_name(&self) -> &'static str;
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::StreamInfo;

    pub fn audio(format_id: &str, abr: f64) -> StreamInfo {
        StreamInfo {
            format_id: format_id.to_string(),
            url: format!("https://media.example/{}", format_id),
            ext: "m4a".to_string(),
            protocol: Some("https".to_string()),
            vcodec: Some("none".to_string()),
            acodec: Some("mp4a.40.2".to_string()),
            abr: Some(abr),
            ..Default::default()
        }
    }

    pub fn progressive(format_id: &str, height: u32, ext: &str) -> StreamInfo {
        StreamInfo {
            format_id: format_id.to_string(),
            url: format!("https://media.example/{}", format_id),
            ext: ext.to_string(),
            protocol: Some("https".to_string()),
            vcodec: Some("avc1.64001F".to_string()),
            acodec: Some("mp4a.40.2".to_string()),
            height: Some(height),
            ..Default::default()
        }
    }

    pub fn video_only(format_id: &str, height: u32) -> StreamInfo {
        StreamInfo {
            acodec: Some("none".to_string()),
            ..progressive(format_id, height, "mp4")
        }
    }
}

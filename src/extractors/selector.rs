//! Stream ranking.
//!
//! Audio: the audio-only stream with the highest bitrate.
//! Video: the progressive (audio + video) mp4 stream with the highest resolution.
//!
//! Only streams that carry the ranking attribute and can be fetched with a plain
//! HTTP GET take part. When several streams share the top rank, the one listed
//! last wins.

use std::cmp::Ordering;

use super::StreamInfo;

/// Container required for the video download
pub const VIDEO_CONTAINER: &str = "mp4";

/// Highest-bitrate audio-only stream
pub fn select_audio(streams: &[StreamInfo]) -> Option<&StreamInfo> {
    streams
        .iter()
        .filter(|s| s.is_direct() && s.is_audio_only())
        .filter_map(|s| s.bitrate().map(|rate| (rate, s)))
        .max_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal))
        .map(|(_, s)| s)
}

/// Highest-resolution progressive mp4 stream
pub fn select_video(streams: &[StreamInfo]) -> Option<&StreamInfo> {
    streams
        .iter()
        .filter(|s| s.is_direct() && s.is_progressive())
        .filter(|s| s.ext.eq_ignore_ascii_case(VIDEO_CONTAINER))
        .filter_map(|s| s.resolution().map(|height| (height, s)))
        .max_by_key(|(height, _)| *height)
        .map(|(_, s)| s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::fixtures::{audio, progressive, video_only};

    #[test]
    fn picks_highest_audio_bitrate() {
        let streams = vec![audio("a96", 96.0), audio("a160", 160.0), audio("a128", 128.0)];
        assert_eq!(select_audio(&streams).unwrap().format_id, "a160");
    }

    #[test]
    fn audio_ignores_streams_with_video() {
        let mut loud = progressive("18", 360, "mp4");
        loud.abr = Some(320.0);
        let streams = vec![loud, audio("a96", 96.0)];
        assert_eq!(select_audio(&streams).unwrap().format_id, "a96");
    }

    #[test]
    fn audio_without_bitrate_is_skipped() {
        let mut unknown = audio("unknown", 0.0);
        unknown.abr = None;
        assert!(select_audio(&[unknown.clone()]).is_none());

        let streams = vec![unknown, audio("a48", 48.0)];
        assert_eq!(select_audio(&streams).unwrap().format_id, "a48");
    }

    #[test]
    fn picks_highest_progressive_mp4() {
        let streams = vec![
            progressive("360", 360, "mp4"),
            progressive("1080", 1080, "mp4"),
            progressive("720", 720, "mp4"),
            progressive("2160", 2160, "webm"),
        ];
        assert_eq!(select_video(&streams).unwrap().format_id, "1080");
    }

    #[test]
    fn video_ignores_adaptive_streams() {
        let streams = vec![video_only("137", 1080), progressive("18", 360, "mp4")];
        assert_eq!(select_video(&streams).unwrap().format_id, "18");
    }

    #[test]
    fn video_ignores_manifest_streams() {
        let mut hls = progressive("96", 1080, "mp4");
        hls.protocol = Some("m3u8_native".to_string());
        let streams = vec![hls, progressive("18", 360, "mp4")];
        assert_eq!(select_video(&streams).unwrap().format_id, "18");
    }

    #[test]
    fn nothing_to_select() {
        let streams = vec![video_only("137", 1080), progressive("43", 360, "webm")];
        assert!(select_video(&streams).is_none());
        assert!(select_audio(&streams).is_none());
        assert!(select_audio(&[]).is_none());
    }

    #[test]
    fn ties_resolve_to_last_listed() {
        let streams = vec![audio("first", 128.0), audio("second", 128.0)];
        assert_eq!(select_audio(&streams).unwrap().format_id, "second");

        let streams = vec![progressive("first", 720, "mp4"), progressive("second", 720, "mp4")];
        assert_eq!(select_video(&streams).unwrap().format_id, "second");
    }
}

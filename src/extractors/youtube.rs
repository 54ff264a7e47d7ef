use anyhow::Context;
use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::{stored_file_name, PlatformClient, StreamInfo, VideoInfo};
use crate::utils::format_file_size;
use crate::Result;

/// Platform client that resolves pages with yt-dlp and fetches the bytes itself
pub struct YtDlpClient {
    yt_dlp_path: String,
    http: Client,
}

impl YtDlpClient {
    pub fn new() -> Self {
        Self::with_path("yt-dlp")
    }

    pub fn with_path(yt_dlp_path: impl Into<String>) -> Self {
        Self {
            yt_dlp_path: yt_dlp_path.into(),
            http: Client::new(),
        }
    }

    /// Get video information using yt-dlp
    async fn dump_json(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!("Extracting video info for: {}", url);

        let output = Command::new(&self.yt_dlp_path)
            .args(["--dump-json", "--no-playlist", "--no-warnings", url])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        let output = match output {
            Ok(output) => output,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                anyhow::bail!(
                    "{} is not available. Please install it: https://github.com/yt-dlp/yt-dlp",
                    self.yt_dlp_path
                );
            }
            Err(e) => return Err(e).context("Failed to run yt-dlp"),
        };

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("yt-dlp failed: {}", error.trim());
        }

        Ok(output.stdout)
    }

    async fn write_stream(&self, stream: &StreamInfo, part_path: &Path) -> Result<u64> {
        let mut request = self.http.get(&stream.url);
        for (name, value) in &stream.http_headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to request stream {}", stream.format_id))?;

        if !response.status().is_success() {
            anyhow::bail!(
                "Failed to download stream {}: HTTP {}",
                stream.format_id,
                response.status()
            );
        }

        let mut file = tokio::fs::File::create(part_path)
            .await
            .with_context(|| format!("Failed to create {}", part_path.display()))?;

        let mut written = 0u64;
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.context("Stream interrupted")?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        Ok(written)
    }
}

/// Parse the output of `yt-dlp --dump-json`
pub fn parse_video_info(json: &[u8]) -> Result<VideoInfo> {
    serde_json::from_slice(json).context("Failed to parse yt-dlp output")
}

#[async_trait]
impl PlatformClient for YtDlpClient {
    async fn fetch_info(&self, url: &str) -> Result<VideoInfo> {
        let json = self.dump_json(url).await?;
        let info = parse_video_info(&json)?;

        tracing::debug!(
            id = %info.id,
            streams = info.streams.len(),
            "Resolved \"{}\"",
            info.title
        );

        Ok(info)
    }

    async fn download(
        &self,
        info: &VideoInfo,
        stream: &StreamInfo,
        dest_dir: &Path,
    ) -> Result<PathBuf> {
        let final_path = dest_dir.join(stored_file_name(info, stream));
        // unique per call so overlapping downloads of one title never share a temp file
        let part_path = dest_dir.join(format!(".{}.part", uuid::Uuid::new_v4().simple()));

        tracing::debug!(
            format_id = %stream.format_id,
            "Downloading to {}",
            final_path.display()
        );

        let written = match self.write_stream(stream, &part_path).await {
            Ok(written) => written,
            Err(e) => {
                let _ = tokio::fs::remove_file(&part_path).await;
                return Err(e);
            }
        };

        // replaces an earlier download of the same title
        tokio::fs::rename(&part_path, &final_path)
            .await
            .with_context(|| format!("Failed to move download into {}", final_path.display()))?;

        tracing::info!(
            "Saved {} ({})",
            final_path.display(),
            format_file_size(written)
        );

        Ok(final_path)
    }

    fn platform_name(&self) -> &'static str {
        "yt-dlp"
    }
}

impl Default for YtDlpClient {
    fn default() -> Self {
        Self::new()
    }
}

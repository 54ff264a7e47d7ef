use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::config::StorageConfig;
use crate::extractors::{select_audio, select_video, PlatformClient, StreamInfo, VideoInfo};
use crate::{ExtractionError, StreamKind};

/// Paths of the two files saved for one URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSelection {
    pub audio: PathBuf,
    pub video: PathBuf,
}

/// Resolves a URL, picks the best audio and video streams and saves them
pub struct ExtractionService {
    client: Arc<dyn PlatformClient>,
    storage: StorageConfig,
    permits: Semaphore,
}

impl ExtractionService {
    pub fn new(client: Arc<dyn PlatformClient>, storage: StorageConfig, max_concurrent: usize) -> Self {
        Self {
            client,
            storage,
            permits: Semaphore::new(max_concurrent.max(1)),
        }
    }

    pub fn storage(&self) -> &StorageConfig {
        &self.storage
    }

    /// Download the highest-bitrate audio-only stream and the highest-resolution
    /// progressive mp4 stream for `url`.
    ///
    /// Both streams are chosen before anything is written, so a missing video
    /// stream does not leave an audio file behind.
    pub async fn resolve(&self, url: &str) -> Result<StreamSelection, ExtractionError> {
        if url.is_empty() {
            return Err(ExtractionError::InvalidInput("URL is empty".to_string()));
        }

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| ExtractionError::ExtractionFailed(e.to_string()))?;

        self.ensure_directories().await?;

        tracing::info!("Resolving streams for {}", url);
        let info = self.client.fetch_info(url).await.map_err(failed)?;

        let audio = select_audio(&info.streams).ok_or(ExtractionError::NotFound(StreamKind::Audio))?;
        let video = select_video(&info.streams).ok_or(ExtractionError::NotFound(StreamKind::Video))?;

        tracing::debug!(
            audio = %audio.format_id,
            abr = ?audio.bitrate(),
            video = %video.format_id,
            height = ?video.resolution(),
            "Selected streams"
        );

        let audio = self.save(&info, audio, StreamKind::Audio).await?;
        let video = self.save(&info, video, StreamKind::Video).await?;

        Ok(StreamSelection { audio, video })
    }

    async fn save(
        &self,
        info: &VideoInfo,
        stream: &StreamInfo,
        kind: StreamKind,
    ) -> Result<PathBuf, ExtractionError> {
        let dir = self.storage.dir_for(kind);
        self.client.download(info, stream, dir).await.map_err(failed)
    }

    async fn ensure_directories(&self) -> Result<(), ExtractionError> {
        for dir in [&self.storage.audio_dir, &self.storage.video_dir] {
            create_dir(dir).await?;
        }
        Ok(())
    }
}

async fn create_dir(dir: &Path) -> Result<(), ExtractionError> {
    tokio::fs::create_dir_all(dir).await.map_err(|e| {
        ExtractionError::ExtractionFailed(format!("Cannot create {}: {}", dir.display(), e))
    })
}

fn failed(err: anyhow::Error) -> ExtractionError {
    ExtractionError::ExtractionFailed(format!("{:#}", err))
}

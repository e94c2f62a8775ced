//! Download-then-extract pipeline for the `extract-audio` command

use crate::downloader::VideoFetcher;
use crate::error::{ExtractError, MediaError};
use crate::extractor::AudioConverter;

use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub url: String,
    pub video_path: PathBuf,
    pub audio_path: PathBuf,
    pub keep_video: bool,
}

/// Pipeline progress stages
#[derive(Debug, Clone)]
pub enum PipelineStage {
    Downloading { url: String },
    Downloaded { title: String, path: PathBuf },
    Extracting { output: PathBuf },
    Extracted { output: PathBuf },
    CleanedUp { removed: PathBuf },
    Complete { output: PathBuf, duration: Duration },
    Failed { stage: String, error: String },
}

pub struct Pipeline<F, C> {
    config: PipelineConfig,
    fetcher: F,
    converter: C,
    progress_tx: mpsc::Sender<PipelineStage>,
}

impl<F: VideoFetcher, C: AudioConverter> Pipeline<F, C> {
    pub fn new(
        config: PipelineConfig,
        fetcher: F,
        converter: C,
        progress_tx: mpsc::Sender<PipelineStage>,
    ) -> Self {
        Self {
            config,
            fetcher,
            converter,
            progress_tx,
        }
    }

    /// Returns the audio path on success. The video file is removed only when
    /// both steps succeed.
    pub async fn run(&self) -> Result<PathBuf, MediaError> {
        let start_time = Instant::now();
        let video_path = &self.config.video_path;
        let audio_path = &self.config.audio_path;

        info!("Starting pipeline for: {}", self.config.url);

        // 1. Download
        self.emit(PipelineStage::Downloading {
            url: self.config.url.clone(),
        })
        .await;

        let metadata = self
            .fetcher
            .fetch(&self.config.url, video_path)
            .await
            .map_err(|e| self.fail("download", e))?;

        self.emit(PipelineStage::Downloaded {
            title: metadata.title.clone(),
            path: video_path.clone(),
        })
        .await;

        // 2. Extract audio
        self.emit(PipelineStage::Extracting {
            output: audio_path.clone(),
        })
        .await;

        if let Some(parent) = audio_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.fail("extract", ExtractError::from(e)))?;
        }

        self.converter
            .extract_audio(video_path, audio_path)
            .await
            .map_err(|e| self.fail("extract", e))?;

        self.emit(PipelineStage::Extracted {
            output: audio_path.clone(),
        })
        .await;

        // 3. Remove the intermediate video
        if self.config.keep_video {
            debug!("Keeping video at: {}", video_path.display());
        } else if tokio::fs::try_exists(video_path).await? {
            tokio::fs::remove_file(video_path).await?;
            self.emit(PipelineStage::CleanedUp {
                removed: video_path.clone(),
            })
            .await;
        }

        let duration = start_time.elapsed();
        info!(
            "Pipeline complete: {} ({:.1}s)",
            audio_path.display(),
            duration.as_secs_f32()
        );

        self.emit(PipelineStage::Complete {
            output: audio_path.clone(),
            duration,
        })
        .await;

        Ok(audio_path.clone())
    }

    async fn emit(&self, stage: PipelineStage) {
        let _ = self.progress_tx.send(stage).await;
    }

    fn fail<E: Into<MediaError> + std::fmt::Display>(&self, stage: &str, e: E) -> MediaError {
        let _ = self.progress_tx.try_send(PipelineStage::Failed {
            stage: stage.to_string(),
            error: e.to_string(),
        });
        e.into()
    }
}

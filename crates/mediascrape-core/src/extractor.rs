//! Audio track extraction and GIF rendering using FFmpeg

use crate::error::ExtractError;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

/// Writes the audio track of a media file to a new file.
#[async_trait]
pub trait AudioConverter: Send + Sync {
    async fn extract_audio(&self, video: &Path, audio: &Path) -> Result<(), ExtractError>;
}

#[derive(Debug)]
pub struct AudioExtractor {
    ffmpeg_path: PathBuf,
}

impl AudioExtractor {
    pub fn new(ffmpeg_path: PathBuf) -> Self {
        Self { ffmpeg_path }
    }
}

#[async_trait]
impl AudioConverter for AudioExtractor {
    /// Drop the video stream; the codec and container follow the extension
    /// of `audio`.
    async fn extract_audio(&self, video: &Path, audio: &Path) -> Result<(), ExtractError> {
        info!("Extracting audio from {}", video.display());

        if !video.exists() {
            return Err(ExtractError::MissingInput(video.to_path_buf()));
        }

        let status = Command::new(&self.ffmpeg_path)
            .args(["-hide_banner", "-loglevel", "error"])
            .arg("-i")
            .arg(video)
            .arg("-vn")
            .arg("-y")
            .arg(audio)
            .status()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => ExtractError::FfmpegNotFound,
                _ => ExtractError::Io(e),
            })?;

        if !status.success() {
            return Err(ExtractError::FfmpegFailed(status.code()));
        }

        debug!("Audio written to: {}", audio.display());
        Ok(())
    }
}

/// Extensions `GifMaker` accepts, lowercase.
pub const GIF_SOURCE_EXTENSIONS: &[&str] = &["mp4", "webm"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GifOptions {
    pub fps: u32,
    /// Output width in pixels; height keeps the aspect ratio
    pub scale: u32,
}

impl Default for GifOptions {
    fn default() -> Self {
        Self { fps: 10, scale: 1800 }
    }
}

pub fn is_gif_source(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| GIF_SOURCE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
}

/// Two-pass palette filter: generate a palette from the clip, then map the
/// clip onto it.
pub fn gif_filter(options: GifOptions) -> String {
    format!(
        "fps={},scale={}:-1:flags=lanczos,split[s0][s1];[s0]palettegen[p];[s1][p]paletteuse",
        options.fps, options.scale
    )
}

pub fn gif_args(input: &Path, output: &Path, options: GifOptions) -> Vec<OsString> {
    vec![
        "-hide_banner".into(),
        "-loglevel".into(),
        "error".into(),
        "-i".into(),
        input.into(),
        "-vf".into(),
        gif_filter(options).into(),
        // Loop forever
        "-loop".into(),
        "0".into(),
        "-y".into(),
        output.into(),
    ]
}

#[derive(Debug)]
pub struct GifMaker {
    ffmpeg_path: PathBuf,
}

impl GifMaker {
    pub fn new(ffmpeg_path: PathBuf) -> Self {
        Self { ffmpeg_path }
    }

    /// Convert one clip. Without `output` the GIF lands next to the input.
    pub async fn convert(
        &self,
        input: &Path,
        output: Option<&Path>,
        options: GifOptions,
    ) -> Result<PathBuf, ExtractError> {
        if !input.exists() {
            return Err(ExtractError::MissingInput(input.to_path_buf()));
        }
        if !is_gif_source(input) {
            let ext = input
                .extension()
                .map(|e| format!(".{}", e.to_string_lossy()))
                .unwrap_or_default();
            return Err(ExtractError::UnsupportedFormat(ext));
        }

        let output = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| input.with_extension("gif"));
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        info!("Rendering {} to GIF", input.display());

        let result = Command::new(&self.ffmpeg_path)
            .args(gif_args(input, &output, options))
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => ExtractError::FfmpegNotFound,
                _ => ExtractError::Io(e),
            })?;

        if !result.status.success() {
            debug!("ffmpeg stderr: {}", String::from_utf8_lossy(&result.stderr));
            return Err(ExtractError::FfmpegFailed(result.status.code()));
        }

        debug!("GIF written to: {}", output.display());
        Ok(output)
    }

    /// Convert every supported clip in `dir` into `out_dir` (default: `dir`).
    /// Per-file failures are returned alongside the successes.
    pub async fn convert_dir(
        &self,
        dir: &Path,
        out_dir: Option<&Path>,
        options: GifOptions,
    ) -> Result<Vec<(PathBuf, Result<PathBuf, ExtractError>)>, ExtractError> {
        let videos = find_gif_sources(dir).await?;
        if videos.is_empty() {
            return Err(ExtractError::NoVideos(dir.to_path_buf()));
        }

        let out_dir = out_dir.unwrap_or(dir);
        let mut results = Vec::with_capacity(videos.len());
        for video in videos {
            let target = out_dir.join(video.with_extension("gif").file_name().unwrap_or_default());
            let result = self.convert(&video, Some(&target), options).await;
            results.push((video, result));
        }
        Ok(results)
    }
}

/// Supported clips directly inside `dir`, sorted by name.
pub async fn find_gif_sources(dir: &Path) -> Result<Vec<PathBuf>, ExtractError> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut videos = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if entry.file_type().await?.is_file() && is_gif_source(&path) {
            videos.push(path);
        }
    }
    videos.sort();
    Ok(videos)
}

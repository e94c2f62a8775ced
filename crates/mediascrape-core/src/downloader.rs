//! Video downloads through yt-dlp

use crate::error::DownloadError;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Output;
use tokio::process::Command;
use tracing::{debug, info};

/// Resolves a URL to a media stream and writes it to a local file.
#[async_trait]
pub trait VideoFetcher: Send + Sync {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<VideoMetadata, DownloadError>;
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoMetadata {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub ext: Option<String>,
}

#[derive(Debug)]
pub struct Downloader {
    yt_dlp_path: PathBuf,
}

impl Downloader {
    pub fn new(yt_dlp_path: PathBuf) -> Self {
        Self { yt_dlp_path }
    }

    /// Download at the best quality into `dir`, named after the video title.
    ///
    /// Separate video and audio streams are merged into `merge_format`. Returns
    /// the path of the final file as reported by yt-dlp.
    pub async fn download_best(
        &self,
        url: &str,
        dir: &Path,
        merge_format: &str,
    ) -> Result<PathBuf, DownloadError> {
        info!("Downloading video from: {}", url);

        tokio::fs::create_dir_all(dir).await?;
        let output_template = dir.join("%(title)s.%(ext)s");

        let mut cmd = Command::new(&self.yt_dlp_path);
        cmd.args(["-f", "bestvideo+bestaudio/best"])
            .args(["--merge-output-format", merge_format])
            .arg("-o")
            .arg(&output_template)
            // Final path after merging/moving, one line per video
            .args(["--print", "after_move:filepath"])
            .arg(url);

        let output = run(cmd).await?;
        check_status(&output, url)?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let path = stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .last()
            .map(PathBuf::from)
            .ok_or_else(|| DownloadError::MissingOutput(output_template.clone()))?;

        debug!("Saved to: {}", path.display());
        Ok(path)
    }
}

#[async_trait]
impl VideoFetcher for Downloader {
    /// Download the best single-file stream to exactly `dest`.
    async fn fetch(&self, url: &str, dest: &Path) -> Result<VideoMetadata, DownloadError> {
        info!("Downloading video from: {}", url);

        let mut cmd = Command::new(&self.yt_dlp_path);
        cmd.args(["-f", "best"])
            .arg("-o")
            .arg(dest)
            // Print the info JSON and still download
            .arg("--print-json")
            .arg("--force-overwrites")
            .arg(url);

        let output = run(cmd).await?;
        check_status(&output, url)?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let metadata = parse_metadata(&stdout)?;
        debug!("Downloaded: {} ({})", metadata.title, metadata.id);

        if !dest.exists() {
            return Err(DownloadError::MissingOutput(dest.to_path_buf()));
        }

        Ok(metadata)
    }
}

async fn run(mut cmd: Command) -> Result<Output, DownloadError> {
    cmd.output().await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DownloadError::YtDlpNotFound,
        _ => DownloadError::Io(e),
    })
}

fn check_status(output: &Output, url: &str) -> Result<(), DownloadError> {
    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    debug!("yt-dlp stderr: {}", stderr);

    if stderr.contains("Video unavailable") || stderr.contains("Private video") {
        return Err(DownloadError::VideoUnavailable(url.to_string()));
    }
    if stderr.contains("is not a valid URL") || stderr.contains("Unsupported URL") {
        return Err(DownloadError::InvalidUrl(url.to_string()));
    }

    Err(DownloadError::YtDlpFailed(output.status.code()))
}

/// yt-dlp prints one JSON object per line; the last one belongs to the
/// downloaded item.
fn parse_metadata(stdout: &str) -> Result<VideoMetadata, DownloadError> {
    let line = stdout
        .lines()
        .map(str::trim)
        .filter(|l| l.starts_with('{'))
        .last()
        .ok_or_else(|| DownloadError::MetadataParse("no JSON on stdout".to_string()))?;

    serde_json::from_str(line).map_err(|e| DownloadError::MetadataParse(e.to_string()))
}

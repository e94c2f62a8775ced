//! Error types for mediascrape-core

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MediaError>;

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Download failed: {0}")]
    Download(#[from] DownloadError),

    #[error("Audio extraction failed: {0}")]
    Extract(#[from] ExtractError),

    #[error("Scrape failed: {0}")]
    Scrape(#[from] ScrapeError),

    #[error("Transcript conversion failed: {0}")]
    Transcript(#[from] TranscriptError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("yt-dlp not found. Install with: brew install yt-dlp")]
    YtDlpNotFound,

    #[error("yt-dlp failed with exit code: {0:?}")]
    YtDlpFailed(Option<i32>),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Video unavailable or private: {0}")]
    VideoUnavailable(String),

    #[error("yt-dlp reported success but {0} was not written")]
    MissingOutput(PathBuf),

    #[error("Failed to parse metadata: {0}")]
    MetadataParse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("FFmpeg not found. Install with: brew install ffmpeg")]
    FfmpegNotFound,

    #[error("FFmpeg failed with exit code: {0:?}")]
    FfmpegFailed(Option<i32>),

    #[error("Input video not found: {0}")]
    MissingInput(PathBuf),

    #[error("Unsupported file format '{0}'. Only .mp4 and .webm are supported.")]
    UnsupportedFormat(String),

    #[error("No .mp4 or .webm files found in {0}")]
    NoVideos(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Page has no visible text: {0}")]
    EmptyPage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum TranscriptError {
    #[error("File '{0}' not found")]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    LoadError(String),

    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}

//! Configuration management for mediascrape

use crate::error::ConfigError;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub paths: PathsConfig,
    pub scrape: ScrapeConfig,
    pub download: DownloadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Path to yt-dlp binary (auto-detected if not set)
    pub yt_dlp: Option<PathBuf>,
    /// Path to FFmpeg binary (auto-detected if not set)
    pub ffmpeg: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// User-Agent header sent with every page request
    pub user_agent: String,
    /// Request timeout in seconds (no timeout if not set)
    pub timeout_secs: Option<u64>,
    /// Directory the digest file is written to
    pub output_directory: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Default directory for `download`
    pub directory: PathBuf,
    /// Container used when yt-dlp merges separate video and audio streams
    pub merge_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: PathsConfig {
                yt_dlp: None,
                ffmpeg: None,
            },
            scrape: ScrapeConfig {
                user_agent: format!("mediascrape/{}", env!("CARGO_PKG_VERSION")),
                timeout_secs: None,
                output_directory: PathBuf::from("."),
            },
            download: DownloadConfig {
                directory: PathBuf::from("."),
                merge_format: "mp4".to_string(),
            },
        }
    }
}

impl Config {
    /// Load configuration from file and environment
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(default_config) = Self::default_file() {
            if default_config.exists() {
                figment = figment.merge(Toml::file(&default_config));
            }
        }

        if let Some(path) = config_file {
            if !path.exists() {
                return Err(ConfigError::LoadError(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("MEDIASCRAPE_").split("__"));

        figment.extract().map_err(|e| ConfigError::LoadError(e.to_string()))
    }

    /// `<config_dir>/mediascrape/config.toml`, if the platform has a config dir
    pub fn default_file() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("mediascrape/config.toml"))
    }

    /// Get yt-dlp path, auto-detecting if not configured
    pub fn yt_dlp_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(ref path) = self.paths.yt_dlp {
            Ok(path.clone())
        } else {
            which::which("yt-dlp")
                .map_err(|_| ConfigError::InvalidValue("yt-dlp not found in PATH".to_string()))
        }
    }

    /// Get FFmpeg path, auto-detecting if not configured
    pub fn ffmpeg_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(ref path) = self.paths.ffmpeg {
            Ok(path.clone())
        } else {
            which::which("ffmpeg")
                .map_err(|_| ConfigError::InvalidValue("ffmpeg not found in PATH".to_string()))
        }
    }
}

impl ScrapeConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.paths.yt_dlp.is_none());
        assert!(config.scrape.timeout().is_none());
        assert_eq!(config.scrape.output_directory, PathBuf::from("."));
        assert_eq!(config.download.merge_format, "mp4");
        assert!(config.scrape.user_agent.starts_with("mediascrape/"));
    }

    #[test]
    fn test_load_overrides_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[scrape]\ntimeout_secs = 15\n\n[paths]\nffmpeg = \"/opt/ffmpeg\"").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.scrape.timeout(), Some(Duration::from_secs(15)));
        assert_eq!(config.ffmpeg_path().unwrap(), PathBuf::from("/opt/ffmpeg"));
        // untouched keys keep their defaults
        assert_eq!(config.download.merge_format, "mp4");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::LoadError(_)));
    }
}

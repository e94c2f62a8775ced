use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

use mediascrape_core::{
    config::Config,
    downloader::Downloader,
    extractor::AudioExtractor,
    pipeline::{Pipeline, PipelineConfig, PipelineStage},
};

pub async fn run(
    url: &str,
    video_path: &Path,
    audio_path: &Path,
    keep_video: bool,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = Config::load(config_path)?;
    let yt_dlp = config
        .yt_dlp_path()
        .context("yt-dlp is required. Install with: brew install yt-dlp")?;
    let ffmpeg = config
        .ffmpeg_path()
        .context("ffmpeg is required. Install with: brew install ffmpeg")?;

    debug!("yt-dlp: {}, ffmpeg: {}", yt_dlp.display(), ffmpeg.display());

    let pipeline_config = PipelineConfig {
        url: url.to_string(),
        video_path: video_path.to_path_buf(),
        audio_path: audio_path.to_path_buf(),
        keep_video,
    };

    let (tx, mut rx) = mpsc::channel(32);

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner:.cyan} [{elapsed_precise}] {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(120));

    let progress_handle = tokio::spawn(async move {
        while let Some(stage) = rx.recv().await {
            match stage {
                PipelineStage::Downloading { url } => {
                    pb.set_message(format!("Downloading {}", truncate(&url, 60)));
                }
                PipelineStage::Downloaded { title, path } => {
                    pb.println(format!(
                        "Video has been downloaded successfully to {} ({})",
                        path.display(),
                        truncate(&title, 40)
                    ));
                }
                PipelineStage::Extracting { output } => {
                    pb.set_message(format!("Extracting audio to {}", output.display()));
                }
                PipelineStage::Extracted { output } => {
                    pb.println(format!(
                        "Audio has been successfully extracted and saved to {}",
                        output.display()
                    ));
                }
                PipelineStage::CleanedUp { removed } => {
                    pb.println(format!("Deleted the downloaded video: {}", removed.display()));
                }
                PipelineStage::Complete { output, duration } => {
                    pb.finish_with_message(format!(
                        "Done: {} ({:.1}s)",
                        output.display(),
                        duration.as_secs_f32()
                    ));
                }
                PipelineStage::Failed { stage, error } => {
                    pb.abandon_with_message(format!("Failed at {}: {}", stage, error));
                }
            }
        }
    });

    let pipeline = Pipeline::new(
        pipeline_config,
        Downloader::new(yt_dlp),
        AudioExtractor::new(ffmpeg),
        tx,
    );
    let result = pipeline.run().await;

    // Close the channel so the progress task can finish
    drop(pipeline);
    progress_handle.await?;

    // The spinner already shows the failing stage; main reports the error once
    let output = result?;
    println!("\nOutput: {}", output.display());
    Ok(())
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a much longer title", 10), "a much ...");
        assert_eq!(truncate("ééééééé", 5), "éé...");
    }
}

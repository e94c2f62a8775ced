use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use mediascrape_core::{config::Config, downloader::Downloader};

pub async fn run(url: Option<String>, save_path: Option<&Path>, config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;

    let url = match url {
        Some(url) => url,
        None => prompt_url().await?,
    };

    let dir = save_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.download.directory.clone());

    let yt_dlp = config
        .yt_dlp_path()
        .context("yt-dlp is required. Install with: brew install yt-dlp")?;
    let downloader = Downloader::new(yt_dlp);

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner:.cyan} [{elapsed_precise}] {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message(format!("Downloading {}", url));

    match downloader
        .download_best(&url, &dir, &config.download.merge_format)
        .await
    {
        Ok(path) => {
            pb.finish_with_message(format!("Saved {}", path.display()));
            Ok(())
        }
        Err(e) => {
            pb.abandon_with_message(format!("Failed: {}", e));
            Err(e.into())
        }
    }
}

async fn prompt_url() -> Result<String> {
    tokio::task::spawn_blocking(|| -> Result<String> {
        print!("Enter YouTube URL: ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        std::io::stdin().read_line(&mut line)?;
        let url = line.trim().to_string();
        if url.is_empty() {
            bail!("No URL given");
        }
        Ok(url)
    })
    .await?
}

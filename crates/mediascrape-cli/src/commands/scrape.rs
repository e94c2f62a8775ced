use anyhow::{Context, Result};
use std::path::Path;
use tokio::sync::mpsc;
use tracing::debug;

use mediascrape_core::{
    config::Config,
    digest::{read_url_list, Digest, ScrapeProgress},
    web::WebClient,
};

pub async fn run(
    title: &str,
    urls_file: &Path,
    output_dir: Option<&Path>,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = Config::load(config_path)?;

    let urls = read_url_list(urls_file)
        .await
        .with_context(|| format!("Failed to read URL file {}", urls_file.display()))?;

    if urls.is_empty() {
        println!("No URLs found in {}", urls_file.display());
    }

    let output_dir = output_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.scrape.output_directory.clone());

    debug!("{} URLs, writing to {}", urls.len(), output_dir.display());
    let client = WebClient::from_config(&config.scrape)?;

    let (tx, mut rx) = mpsc::channel(32);
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                ScrapeProgress::Fetching { url, index, total } => {
                    println!("[{}/{}] Fetching text from {}", index, total, url);
                }
                ScrapeProgress::Fetched { chars, .. } => {
                    println!("      {} characters", chars);
                }
                ScrapeProgress::Failed { url, error } => {
                    println!("Error fetching {}: {}", url, error);
                }
            }
        }
    });

    let digest = Digest::collect(title, &urls, &client, Some(&tx)).await;
    drop(tx);
    printer.await?;

    let path = digest.write_to(&output_dir).await?;

    let failures = digest.failures();
    if failures > 0 {
        println!("{} of {} URLs could not be retrieved", failures, urls.len());
    }
    println!("Text saved to {}", path.display());

    Ok(())
}

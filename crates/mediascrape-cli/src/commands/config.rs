use anyhow::Result;
use std::path::Path;
use mediascrape_core::config::Config;

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;

    println!("mediascrape configuration\n");

    println!("[paths]");
    if let Some(ref p) = config.paths.yt_dlp {
        println!("  yt_dlp = {:?}", p);
    } else {
        println!("  yt_dlp = (auto-detect)");
    }
    if let Some(ref p) = config.paths.ffmpeg {
        println!("  ffmpeg = {:?}", p);
    } else {
        println!("  ffmpeg = (auto-detect)");
    }

    println!("\n[scrape]");
    println!("  user_agent = {:?}", config.scrape.user_agent);
    if let Some(secs) = config.scrape.timeout_secs {
        println!("  timeout_secs = {}", secs);
    } else {
        println!("  timeout_secs = (none)");
    }
    println!("  output_directory = {:?}", config.scrape.output_directory);

    println!("\n[download]");
    println!("  directory = {:?}", config.download.directory);
    println!("  merge_format = {:?}", config.download.merge_format);

    // Show config file locations
    println!("\nConfig file locations (in priority order):");
    if let Some(p) = config_path {
        println!("  1. {} (specified)", p.display());
    }
    if let Some(default_file) = Config::default_file() {
        println!("  2. {}", default_file.display());
    }
    println!("  3. Environment variables (MEDIASCRAPE_<SECTION>__<KEY>)");

    Ok(())
}

mod args;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use args::{Cli, Commands};
use mediascrape_core::extractor::GifOptions;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let filter = match cli.verbose {
        // Target prefix also covers mediascrape_core
        0 => "mediascrape=warn",
        1 => "mediascrape=info",
        2 => "mediascrape=debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::ExtractAudio {
            video_url,
            video_filename,
            audio_filename,
            keep_video,
        } => {
            commands::extract_audio::run(
                &video_url,
                &video_filename,
                &audio_filename,
                keep_video,
                config_path,
            )
            .await
        }
        Commands::Scrape {
            title,
            urls_file,
            output_dir,
        } => commands::scrape::run(&title, &urls_file, output_dir.as_deref(), config_path).await,
        Commands::Download { url, save_path } => {
            commands::download::run(url, save_path.as_deref(), config_path).await
        }
        Commands::Gif {
            input,
            output,
            fps,
            scale,
        } => {
            let options = GifOptions { fps, scale };
            commands::gif::run(&input, output.as_deref(), options, config_path).await
        }
        Commands::Vtt { input, output } => commands::vtt::run(&input, output.as_deref()).await,
        Commands::Doctor => commands::doctor::run(config_path).await,
        Commands::Config => commands::config::run(config_path).await,
    }
}

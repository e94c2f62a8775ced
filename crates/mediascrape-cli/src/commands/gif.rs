use anyhow::{Context, Result};
use std::path::Path;

use mediascrape_core::{
    config::Config,
    extractor::{GifMaker, GifOptions},
};

pub async fn run(
    input: &Path,
    output: Option<&Path>,
    options: GifOptions,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = Config::load(config_path)?;
    let ffmpeg = config
        .ffmpeg_path()
        .context("ffmpeg is required. Install with: brew install ffmpeg")?;
    let maker = GifMaker::new(ffmpeg);

    if !input.is_dir() {
        let gif = maker.convert(input, output, options).await?;
        println!("Conversion complete! GIF saved to: {}", gif.display());
        return Ok(());
    }

    let results = maker.convert_dir(input, output, options).await?;
    println!("Found {} video files to process.", results.len());

    let mut failed = 0;
    for (video, result) in results {
        match result {
            Ok(gif) => println!("Conversion complete! GIF saved to: {}", gif.display()),
            Err(e) => {
                failed += 1;
                println!("Error converting {}: {}", video.display(), e);
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} conversions failed", failed);
    }
    Ok(())
}

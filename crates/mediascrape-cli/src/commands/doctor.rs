use anyhow::Result;
use std::path::{Path, PathBuf};
use std::process::Command;
use which::which;

use mediascrape_core::config::Config;

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;

    println!("mediascrape dependency check\n");

    let mut all_ok = true;

    // Check yt-dlp
    print!("yt-dlp:  ");
    let yt_dlp = config.paths.yt_dlp.clone().or_else(|| which("yt-dlp").ok());
    all_ok &= report(yt_dlp, "--version", "brew install yt-dlp", |out| {
        out.trim().to_string()
    });

    // Check FFmpeg
    print!("ffmpeg:  ");
    let ffmpeg = config.paths.ffmpeg.clone().or_else(|| which("ffmpeg").ok());
    all_ok &= report(ffmpeg, "-version", "brew install ffmpeg", |out| {
        // "ffmpeg version 6.1.1 Copyright ..." -> "6.1.1"
        out.lines()
            .next()
            .and_then(|l| l.split_whitespace().nth(2))
            .unwrap_or("unknown")
            .to_string()
    });

    println!();
    if all_ok {
        println!("All dependencies OK!");
    } else {
        println!("Some dependencies are missing. See above for installation instructions.");
    }

    Ok(())
}

fn report(
    path: Option<PathBuf>,
    version_flag: &str,
    install_hint: &str,
    parse_version: impl Fn(&str) -> String,
) -> bool {
    let Some(path) = path else {
        println!("NOT FOUND");
        println!("         Install with: {}", install_hint);
        return false;
    };

    match Command::new(&path).arg(version_flag).output() {
        Ok(out) if out.status.success() => {
            let stdout = String::from_utf8_lossy(&out.stdout);
            println!("OK ({})", parse_version(&stdout));
            true
        }
        _ => {
            println!("FOUND at {} but failed to get version", path.display());
            false
        }
    }
}

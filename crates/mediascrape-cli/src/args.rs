use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mediascrape")]
#[command(author, version, about = "Audio extraction, page scraping and transcript helpers")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download a video, extract its audio track, then delete the video
    ExtractAudio {
        /// Video page URL
        video_url: String,

        /// Where the downloaded video is written (removed afterwards)
        video_filename: PathBuf,

        /// Audio output; the extension picks the format (e.g. talk.mp3)
        audio_filename: PathBuf,

        /// Keep the downloaded video
        #[arg(long)]
        keep_video: bool,
    },

    /// Fetch every URL in a list and save their text under one title
    Scrape {
        /// Document title (also names the output file)
        title: String,

        /// File containing URLs, one per line
        urls_file: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Download a video at the best quality, merged to MP4
    Download {
        /// Video page URL (prompted for when omitted)
        url: Option<String>,

        /// Directory to save into
        save_path: Option<PathBuf>,
    },

    /// Convert a WebVTT subtitle file to plain text
    Vtt {
        /// Input .vtt file
        input: PathBuf,

        /// Output .txt file (defaults to the input name with .txt)
        output: Option<PathBuf>,
    },

    /// Convert an .mp4/.webm clip, or every clip in a directory, to an animated GIF
    Gif {
        /// Input clip or directory of clips
        input: PathBuf,

        /// Output .gif file, or output directory when the input is a directory
        output: Option<PathBuf>,

        /// Frames per second
        #[arg(long, default_value = "10")]
        fps: u32,

        /// Output width in pixels
        #[arg(long, default_value = "1800")]
        scale: u32,
    },

    /// Check external tool dependencies
    Doctor,

    /// Show configuration
    Config,
}

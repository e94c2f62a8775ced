//! mediascrape-core: audio extraction, page digests and transcript helpers

pub mod config;
pub mod digest;
pub mod downloader;
pub mod error;
pub mod extractor;
pub mod pipeline;
pub mod transcript;
pub mod web;

pub use config::Config;
pub use error::{MediaError, Result};

pub mod config;
pub mod doctor;
pub mod download;
pub mod extract_audio;
pub mod gif;
pub mod scrape;
pub mod vtt;

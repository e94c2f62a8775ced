//! WebVTT subtitles to plain text

use crate::error::TranscriptError;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info};

fn tag_regex() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"<[^>]+>").expect("valid regex"))
}

/// Subtitle text lines of a VTT document, in order.
pub fn vtt_to_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| {
            !line.is_empty()
                && !line.starts_with("WEBVTT")
                && !line.contains("-->")
                && !line.starts_with("NOTE")
        })
        .map(|line| tag_regex().replace_all(line, "").into_owned())
        .filter(|line| !line.is_empty())
        .collect()
}

/// `talk.en.vtt` becomes `talk.en.txt`.
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("txt")
}

#[derive(Debug)]
pub struct Conversion {
    pub output: PathBuf,
    pub lines: usize,
}

pub async fn convert_file(
    input: &Path,
    output: Option<&Path>,
) -> Result<Conversion, TranscriptError> {
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_path(input));

    let content = match tokio::fs::read_to_string(input).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(TranscriptError::NotFound(input.to_path_buf()))
        }
        Err(e) => return Err(e.into()),
    };

    let lines = vtt_to_lines(&content);
    debug!("{} subtitle lines in {}", lines.len(), input.display());

    tokio::fs::write(&output, lines.join("\n")).await?;
    info!("Converted {} to {}", input.display(), output.display());

    Ok(Conversion {
        output,
        lines: lines.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "WEBVTT\nKind: captions\n\nNOTE generated by a tool\n\n1\n00:00:01.000 --> 00:00:04.000\n<v Speaker>Hello <i>there</i>\n\n00:00:04.500 --> 00:00:06.000 align:start position:10%\n  General Kenobi  \n<c></c>\n";

    #[test]
    fn test_vtt_to_lines() {
        assert_eq!(
            vtt_to_lines(SAMPLE),
            vec!["Kind: captions", "1", "Hello there", "General Kenobi"]
        );
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("subs/talk.en.vtt")),
            PathBuf::from("subs/talk.en.txt")
        );
    }

    #[tokio::test]
    async fn test_convert_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("talk.vtt");
        tokio::fs::write(&input, SAMPLE).await.unwrap();

        let result = convert_file(&input, None).await.unwrap();
        assert_eq!(result.output, dir.path().join("talk.txt"));
        assert_eq!(result.lines, 4);

        let written = tokio::fs::read_to_string(&result.output).await.unwrap();
        assert_eq!(written, "Kind: captions\n1\nHello there\nGeneral Kenobi");
    }

    #[tokio::test]
    async fn test_convert_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = convert_file(&dir.path().join("absent.vtt"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, TranscriptError::NotFound(_)));
    }
}

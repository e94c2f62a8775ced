//! Multi-URL text digest: one titled file built from many pages

use crate::error::ScrapeError;
use crate::web::PageFetcher;

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::info;

/// Derive the digest file name from its title.
pub fn slugify_title(title: &str) -> String {
    format!("{}.txt", title.replace(' ', "_"))
}

/// Parse a URL list: one URL per line, blank lines skipped. Every other line
/// is kept as written, even if it is not a usable URL.
pub fn parse_url_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}

pub async fn read_url_list(path: &Path) -> Result<Vec<String>, ScrapeError> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(parse_url_list(&content))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Section {
    Text { url: String, text: String },
    Failed { url: String },
}

impl Section {
    pub fn url(&self) -> &str {
        match self {
            Section::Text { url, .. } | Section::Failed { url } => url,
        }
    }
}

#[derive(Debug, Clone)]
pub enum ScrapeProgress {
    Fetching { url: String, index: usize, total: usize },
    Fetched { url: String, chars: usize },
    Failed { url: String, error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    pub title: String,
    pub sections: Vec<Section>,
}

impl Digest {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            sections: Vec::new(),
        }
    }

    /// Fetch every URL in order, one at a time. A failed page becomes a
    /// placeholder section and never aborts the run.
    pub async fn collect<P: PageFetcher>(
        title: &str,
        urls: &[String],
        fetcher: &P,
        progress_tx: Option<&mpsc::Sender<ScrapeProgress>>,
    ) -> Self {
        let mut digest = Self::new(title);
        let total = urls.len();

        for (index, url) in urls.iter().enumerate() {
            info!("Fetching text from {}", url);
            emit(
                progress_tx,
                ScrapeProgress::Fetching {
                    url: url.clone(),
                    index: index + 1,
                    total,
                },
            )
            .await;

            match fetcher.fetch_text(url).await {
                Ok(text) => {
                    emit(
                        progress_tx,
                        ScrapeProgress::Fetched {
                            url: url.clone(),
                            chars: text.chars().count(),
                        },
                    )
                    .await;
                    digest.sections.push(Section::Text {
                        url: url.clone(),
                        text,
                    });
                }
                Err(e) => {
                    info!("Error fetching {}: {}", url, e);
                    emit(
                        progress_tx,
                        ScrapeProgress::Failed {
                            url: url.clone(),
                            error: e.to_string(),
                        },
                    )
                    .await;
                    digest.sections.push(Section::Failed { url: url.clone() });
                }
            }
        }

        digest
    }

    pub fn file_name(&self) -> String {
        slugify_title(&self.title)
    }

    pub fn failures(&self) -> usize {
        self.sections
            .iter()
            .filter(|s| matches!(s, Section::Failed { .. }))
            .count()
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.title);
        let _ = writeln!(out, "{}\n", "=".repeat(self.title.chars().count()));

        for section in &self.sections {
            match section {
                Section::Text { url, text } => {
                    let _ = write!(out, "URL: {}\n{}\n\n", url, text);
                }
                Section::Failed { url } => {
                    let _ = write!(out, "Failed to retrieve content from {}\n\n", url);
                }
            }
        }

        out
    }

    /// Write the rendered digest into `dir` and return the file path.
    pub async fn write_to(&self, dir: &Path) -> Result<PathBuf, ScrapeError> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(self.file_name());
        tokio::fs::write(&path, self.render()).await?;
        info!("Text saved to {}", path.display());
        Ok(path)
    }
}

async fn emit(tx: Option<&mpsc::Sender<ScrapeProgress>>, event: ScrapeProgress) {
    if let Some(tx) = tx {
        let _ = tx.send(event).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::WebClient;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    struct StaticPages(HashMap<String, String>);

    #[async_trait]
    impl PageFetcher for StaticPages {
        async fn fetch_text(&self, url: &str) -> Result<String, ScrapeError> {
            self.0
                .get(url)
                .cloned()
                .ok_or_else(|| ScrapeError::EmptyPage(url.to_string()))
        }
    }

    #[test]
    fn test_slugify_title() {
        assert_eq!(slugify_title("My Reading List"), "My_Reading_List.txt");
        assert_eq!(slugify_title("  two  spaces "), "__two__spaces_.txt");
        assert_eq!(slugify_title("plain"), "plain.txt");
    }

    #[test]
    fn test_parse_url_list() {
        let content = "example.com\n\n   \n  https://a.org/x  \n# not a comment\nb.net\n";
        assert_eq!(
            parse_url_list(content),
            vec!["example.com", "https://a.org/x", "# not a comment", "b.net"]
        );
    }

    #[tokio::test]
    async fn test_hash_line_gets_its_own_section() {
        let urls = parse_url_list("#blog.example.com/post\nexample.com\n");
        assert_eq!(urls.len(), 2);

        let pages = StaticPages(HashMap::from([(
            "example.com".to_string(),
            "hello".to_string(),
        )]));
        let digest = Digest::collect("T", &urls, &pages, None).await;
        assert_eq!(
            digest.render(),
            "T\n=\n\nFailed to retrieve content from #blog.example.com/post\n\nURL: example.com\nhello\n\n"
        );
    }

    #[test]
    fn test_render() {
        let digest = Digest {
            title: "Notes".to_string(),
            sections: vec![
                Section::Text {
                    url: "a.org".to_string(),
                    text: "hello\nworld".to_string(),
                },
                Section::Failed {
                    url: "b.org".to_string(),
                },
            ],
        };

        assert_eq!(
            digest.render(),
            "Notes\n=====\n\nURL: a.org\nhello\nworld\n\nFailed to retrieve content from b.org\n\n"
        );
        assert_eq!(digest.failures(), 1);
    }

    #[test]
    fn test_render_underline_counts_chars() {
        let digest = Digest::new("Café");
        assert!(digest.render().starts_with("Café\n====\n\n"));
    }

    #[tokio::test]
    async fn test_collect_keeps_order_and_continues_after_failure() {
        let pages = StaticPages(HashMap::from([
            ("one.org".to_string(), "first".to_string()),
            ("three.org".to_string(), "third".to_string()),
        ]));
        let urls = vec![
            "one.org".to_string(),
            "two.org".to_string(),
            "three.org".to_string(),
        ];
        let (tx, mut rx) = mpsc::channel(16);

        let digest = Digest::collect("T", &urls, &pages, Some(&tx)).await;
        drop(tx);

        let order: Vec<&str> = digest.sections.iter().map(Section::url).collect();
        assert_eq!(order, vec!["one.org", "two.org", "three.org"]);
        assert_eq!(
            digest.sections[1],
            Section::Failed {
                url: "two.org".to_string()
            }
        );

        let mut failed = 0;
        while let Some(event) = rx.recv().await {
            if matches!(event, ScrapeProgress::Failed { .. }) {
                failed += 1;
            }
        }
        assert_eq!(failed, 1);
    }

    /// Serve one HTML response with the given status line on a loopback port.
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });

        format!("http://{}/", addr)
    }

    #[tokio::test]
    async fn test_end_to_end_reachable_and_unreachable() {
        let reachable =
            serve_once("200 OK", "<html><body><h1>Post</h1><p>Body text</p></body></html>").await;
        // Port 1 on loopback refuses connections
        let unreachable = "http://127.0.0.1:1/".to_string();

        let dir = tempfile::tempdir().unwrap();
        let list = dir.path().join("urls.txt");
        tokio::fs::write(&list, format!("{}\n\n{}\n", reachable, unreachable))
            .await
            .unwrap();

        let urls = read_url_list(&list).await.unwrap();
        let client = WebClient::new("mediascrape-test", None).unwrap();
        let digest = Digest::collect("Weekly Reads", &urls, &client, None).await;
        let path = digest.write_to(dir.path()).await.unwrap();

        assert_eq!(path, dir.path().join("Weekly_Reads.txt"));
        let written = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(
            written,
            format!(
                "Weekly Reads\n============\n\nURL: {}\nPost\nBody text\n\nFailed to retrieve content from {}\n\n",
                reachable, unreachable
            )
        );
    }

    #[tokio::test]
    async fn test_error_status_and_empty_body_are_failures() {
        let missing = serve_once("404 Not Found", "<html><body><p>Not here</p></body></html>").await;
        let blank = serve_once("200 OK", "<html><body>  <script>x()</script> </body></html>").await;
        let urls = vec![missing.clone(), blank.clone()];

        let client = WebClient::new("mediascrape-test", None).unwrap();
        let digest = Digest::collect("Gaps", &urls, &client, None).await;

        assert_eq!(digest.failures(), 2);
        assert_eq!(
            digest.render(),
            format!(
                "Gaps\n====\n\nFailed to retrieve content from {}\n\nFailed to retrieve content from {}\n\n",
                missing, blank
            )
        );
    }

    #[tokio::test]
    async fn test_fetch_text_error_kinds() {
        let client = WebClient::new("mediascrape-test", None).unwrap();

        let missing = serve_once("404 Not Found", "<html><body>gone</body></html>").await;
        let err = client.fetch_text(&missing).await.unwrap_err();
        match err {
            ScrapeError::Http(e) => {
                assert_eq!(e.status(), Some(reqwest::StatusCode::NOT_FOUND));
            }
            other => panic!("expected an HTTP status error, got {other:?}"),
        }

        let blank = serve_once("200 OK", "<html><body></body></html>").await;
        let err = client.fetch_text(&blank).await.unwrap_err();
        assert!(matches!(err, ScrapeError::EmptyPage(url) if url == blank));
    }
}

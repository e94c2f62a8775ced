//! Page fetching and HTML-to-text conversion

use crate::config::ScrapeConfig;
use crate::error::ScrapeError;
use async_trait::async_trait;
use regex::Regex;
use scraper::{Html, Node, Selector};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::debug;

/// Elements whose text never reaches the reader.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Fetches a page and returns its visible text.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String, ScrapeError>;
}

#[derive(Debug, Clone)]
pub struct WebClient {
    client: reqwest::Client,
}

impl WebClient {
    pub fn new(user_agent: &str, timeout: Option<Duration>) -> Result<Self, ScrapeError> {
        let mut builder = reqwest::Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    pub fn from_config(config: &ScrapeConfig) -> Result<Self, ScrapeError> {
        Self::new(&config.user_agent, config.timeout())
    }
}

#[async_trait]
impl PageFetcher for WebClient {
    async fn fetch_text(&self, url: &str) -> Result<String, ScrapeError> {
        let url = normalize_url(url);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?.error_for_status()?;
        let html = response.text().await?;

        let text = html_to_text(&html);
        if text.is_empty() {
            return Err(ScrapeError::EmptyPage(url));
        }
        Ok(text)
    }
}

/// Prefix `https://` unless the URL already starts with an http(s) scheme.
pub fn normalize_url(url: &str) -> String {
    static SCHEME: OnceLock<Regex> = OnceLock::new();
    let scheme = SCHEME.get_or_init(|| Regex::new(r"(?i)^https?://").expect("valid regex"));

    if scheme.is_match(url) {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

/// Visible text of the document body: one trimmed text node per line, empty
/// nodes dropped.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let body_selector = Selector::parse("body").expect("valid selector");
    let root = document
        .select(&body_selector)
        .next()
        .unwrap_or_else(|| document.root_element());

    let mut lines = Vec::new();
    for node in root.descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
        });
        if hidden {
            continue;
        }

        let trimmed = text.trim();
        if !trimmed.is_empty() {
            lines.push(trimmed);
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_adds_scheme() {
        assert_eq!(normalize_url("example.com/post"), "https://example.com/post");
        assert_eq!(normalize_url("www.example.com"), "https://www.example.com");
    }

    #[test]
    fn test_normalize_keeps_existing_scheme() {
        assert_eq!(normalize_url("http://example.com"), "http://example.com");
        assert_eq!(normalize_url("https://example.com"), "https://example.com");
        assert_eq!(normalize_url("HTTPS://Example.com"), "HTTPS://Example.com");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for url in ["example.com", "http://a.org/x", "blog.example.net/p?id=1"] {
            let once = normalize_url(url);
            assert_eq!(normalize_url(&once), once);
            assert_eq!(once.matches("://").count(), 1);
        }
    }

    #[test]
    fn test_html_to_text() {
        let html = r#"<html>
            <head><title>Ignored</title><style>body { color: red }</style></head>
            <body>
                <h1>  Heading </h1>
                <p>First <b>bold</b> paragraph.</p>
                <script>var hidden = 1;</script>
                <noscript>enable js</noscript>
                <ul><li>one</li><li>two</li></ul>
            </body>
        </html>"#;

        assert_eq!(
            html_to_text(html),
            "Heading\nFirst\nbold\nparagraph.\none\ntwo"
        );
    }

    #[test]
    fn test_html_to_text_empty_body() {
        assert_eq!(html_to_text("<html><body>   </body></html>"), "");
    }

    #[test]
    fn test_html_to_text_fragment() {
        assert_eq!(html_to_text("just <i>text</i>"), "just\ntext");
    }

    #[tokio::test]
    async fn test_configured_timeout_applies() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept and hold the connection without ever answering
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let mut config = crate::Config::default().scrape;
        config.timeout_secs = Some(1);
        let client = WebClient::from_config(&config).unwrap();

        let err = client
            .fetch_text(&format!("http://{}/", addr))
            .await
            .unwrap_err();
        match err {
            ScrapeError::Http(e) => assert!(e.is_timeout(), "not a timeout: {e}"),
            other => panic!("expected a timeout, got {other:?}"),
        }
    }
}

//! Feed retrieval.
//!
//! [`FeedSource`] is the capability the runner uses to pull one feed.
//! [`HttpFeedSource`] implements it over HTTP with resource limits and
//! parses RSS, Atom and JSON Feed documents with `feed-rs`.

use std::future::Future;
use std::time::Duration;

use feed_rs::parser;
use reqwest::Client;

use crate::config::FetchConfig;
use crate::error::{RelayError, Result};
use crate::feed::types::{FeedItem, UNTITLED};

/// Something that can retrieve the current items of a feed.
pub trait FeedSource {
    /// Fetch and parse the feed at `url`.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<FeedItem>>>;
}

/// HTTP feed fetcher.
pub struct HttpFeedSource {
    client: Client,
    max_feed_size: u64,
}

impl HttpFeedSource {
    /// Create a new fetcher from the fetch configuration.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| RelayError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self::with_client(client, config.max_feed_size_bytes))
    }

    /// Create a fetcher using a preconfigured HTTP client.
    pub fn with_client(client: Client, max_feed_size: u64) -> Self {
        Self {
            client,
            max_feed_size,
        }
    }
}

impl FeedSource for HttpFeedSource {
    async fn fetch(&self, url: &str) -> Result<Vec<FeedItem>> {
        validate_url(url)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RelayError::Fetch(format!("failed to fetch feed: {}", e)))?;

        if !response.status().is_success() {
            return Err(RelayError::Fetch(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        if let Some(content_length) = response.content_length() {
            if content_length > self.max_feed_size {
                return Err(RelayError::Fetch(format!(
                    "feed too large: {} bytes (max {} bytes)",
                    content_length, self.max_feed_size
                )));
            }
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| RelayError::Fetch(format!("failed to read response: {}", e)))?;

        // Content-Length may be absent or wrong
        if bytes.len() as u64 > self.max_feed_size {
            return Err(RelayError::Fetch(format!(
                "feed too large: {} bytes (max {} bytes)",
                bytes.len(),
                self.max_feed_size
            )));
        }

        parse_feed(&bytes)
    }
}

/// Validate a source URL before fetching it.
///
/// Only `http` and `https` URLs with a host are accepted.
pub fn validate_url(url: &str) -> Result<()> {
    let parsed =
        url::Url::parse(url).map_err(|e| RelayError::Fetch(format!("invalid URL: {}", e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(RelayError::Fetch(format!(
                "unsupported URL scheme: {}",
                scheme
            )));
        }
    }

    if parsed.host().is_none() {
        return Err(RelayError::Fetch("URL has no host".to_string()));
    }

    Ok(())
}

/// Parse feed bytes into items.
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<FeedItem>> {
    let feed = parser::parse(bytes)
        .map_err(|e| RelayError::Fetch(format!("failed to parse feed: {}", e)))?;

    let items = feed
        .entries
        .into_iter()
        .map(|entry| {
            let title = entry
                .title
                .map(|t| t.content.trim().to_string())
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| UNTITLED.to_string());
            let link = entry
                .links
                .first()
                .map(|l| l.href.clone())
                .unwrap_or_default();

            FeedItem {
                guid: entry.id,
                title,
                link,
                published_at: entry.published.or(entry.updated),
            }
        })
        .collect();

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const SMALL_RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Served Feed</title>
    <item>
      <title>Served Article</title>
      <link>https://example.com/served</link>
      <guid>served-1</guid>
      <pubDate>Fri, 10 May 2024 09:00:00 GMT</pubDate>
    </item>
  </channel>
</rss>"#;

    /// Answer one GET request with `response` written verbatim.
    async fn serve_once(response: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut chunk).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => buf.extend_from_slice(&chunk[..n]),
                }
            }
            // the client may hang up early once it has seen the headers
            stream.write_all(response.as_bytes()).await.ok();
            stream.shutdown().await.ok();
        });

        format!("http://{addr}/feed.xml")
    }

    fn test_source(max_feed_size: u64) -> HttpFeedSource {
        let client = Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        HttpFeedSource::with_client(client, max_feed_size)
    }

    fn response(status_line: &str, body: &str) -> String {
        format!(
            "{status_line}\r\nContent-Type: application/rss+xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    #[tokio::test]
    async fn test_fetch_parses_served_feed() {
        let url = serve_once(response("HTTP/1.1 200 OK", SMALL_RSS)).await;

        let items = test_source(64 * 1024).fetch(&url).await.unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].guid, "served-1");
        assert_eq!(items[0].title, "Served Article");
        assert_eq!(items[0].link, "https://example.com/served");
        assert_eq!(
            items[0].published_at,
            Some(Utc.with_ymd_and_hms(2024, 5, 10, 9, 0, 0).unwrap())
        );
    }

    #[tokio::test]
    async fn test_fetch_server_error_status() {
        let url = serve_once(response("HTTP/1.1 500 Internal Server Error", "oops")).await;

        let err = test_source(64 * 1024).fetch(&url).await.unwrap_err();

        assert!(matches!(err, RelayError::Fetch(_)));
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_fetch_rejects_declared_oversized_body() {
        let raw = "HTTP/1.1 200 OK\r\nContent-Type: application/rss+xml\r\nContent-Length: 100000\r\nConnection: close\r\n\r\n<rss>".to_string();
        let url = serve_once(raw).await;

        let err = test_source(1024).fetch(&url).await.unwrap_err();

        assert!(matches!(err, RelayError::Fetch(_)));
        assert!(err.to_string().contains("feed too large: 100000 bytes"));
    }

    #[tokio::test]
    async fn test_fetch_rejects_oversized_chunked_body() {
        // no Content-Length, so the limit is enforced on the body read
        let body = "x".repeat(2048);
        let raw = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/rss+xml\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n{:x}\r\n{body}\r\n0\r\n\r\n",
            body.len()
        );
        let url = serve_once(raw).await;

        let err = test_source(1024).fetch(&url).await.unwrap_err();

        assert!(matches!(err, RelayError::Fetch(_)));
        assert!(err.to_string().contains("feed too large: 2048 bytes"));
    }

    #[test]
    fn test_validate_url_valid() {
        assert!(validate_url("https://example.com/feed.xml").is_ok());
        assert!(validate_url("http://127.0.0.1:8080/feed.xml").is_ok());
    }

    #[test]
    fn test_validate_url_invalid_scheme() {
        let result = validate_url("ftp://example.com/feed.xml");
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("unsupported URL scheme"));
    }

    #[test]
    fn test_validate_url_not_a_url() {
        let result = validate_url("not a url");
        assert!(matches!(result, Err(RelayError::Fetch(_))));
        assert!(result.unwrap_err().to_string().contains("invalid URL"));
    }

    #[test]
    fn test_http_feed_source_new() {
        assert!(HttpFeedSource::new(&FetchConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_fetch_rejects_invalid_url_before_request() {
        let source = HttpFeedSource::new(&FetchConfig::default()).unwrap();
        let result = source.fetch("file:///etc/passwd").await;
        assert!(matches!(result, Err(RelayError::Fetch(_))));
    }

    #[test]
    fn test_parse_feed_rss() {
        let rss = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Test Feed</title>
    <link>https://example.com</link>
    <description>A test feed</description>
    <item>
      <title>First Article</title>
      <link>https://example.com/1</link>
      <guid>guid-1</guid>
      <pubDate>Mon, 15 Jan 2024 10:30:00 GMT</pubDate>
    </item>
    <item>
      <title>Second Article</title>
      <link>https://example.com/2</link>
      <guid>guid-2</guid>
    </item>
  </channel>
</rss>"#;

        let items = parse_feed(rss.as_bytes()).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].guid, "guid-1");
        assert_eq!(items[0].title, "First Article");
        assert_eq!(items[0].link, "https://example.com/1");
        assert_eq!(
            items[0].published_at,
            Some(Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap())
        );
        assert_eq!(items[1].guid, "guid-2");
        assert!(items[1].published_at.is_none());
    }

    #[test]
    fn test_parse_feed_atom_uses_updated() {
        let atom = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom Feed</title>
  <link href="https://example.com"/>
  <entry>
    <id>urn:uuid:1</id>
    <title>Atom Entry</title>
    <link href="https://example.com/entry"/>
    <updated>2025-01-01T00:00:00Z</updated>
  </entry>
</feed>"#;

        let items = parse_feed(atom.as_bytes()).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].guid, "urn:uuid:1");
        assert_eq!(items[0].title, "Atom Entry");
        assert_eq!(items[0].link, "https://example.com/entry");
        assert_eq!(
            items[0].published_at,
            Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_feed_minimal() {
        let rss = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <item>
      <guid>1</guid>
    </item>
  </channel>
</rss>"#;

        let items = parse_feed(rss.as_bytes()).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].guid, "1");
        assert_eq!(items[0].title, UNTITLED);
        assert!(items[0].link.is_empty());
    }

    #[test]
    fn test_parse_feed_invalid() {
        let invalid = "This is not XML";
        assert!(parse_feed(invalid.as_bytes()).is_err());
    }
}

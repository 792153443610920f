//! Source list: the feeds to poll, in order.

use std::collections::HashSet;
use std::path::Path;

use tracing::warn;

use crate::Result;

/// Ordered list of feed URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceList {
    urls: Vec<String>,
}

impl SourceList {
    /// Load the source list from a file. A missing or unreadable file is an error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Ok(Self::parse(&content))
    }

    /// Parse a newline-delimited list of URLs.
    ///
    /// Lines are trimmed; blank lines and `#` comments are skipped, and a URL
    /// listed twice is only polled once.
    pub fn parse(content: &str) -> Self {
        let mut seen = HashSet::new();
        let mut urls = Vec::new();

        for line in content.lines() {
            let url = line.trim();
            if url.is_empty() || url.starts_with('#') {
                continue;
            }
            if !seen.insert(url) {
                warn!("Duplicate source ignored: {}", url);
                continue;
            }
            urls.push(url.to_string());
        }

        Self { urls }
    }

    /// Number of sources.
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    /// Whether there are no sources.
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Iterate over the URLs in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.urls.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for SourceList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            urls: iter.into_iter().map(Into::into).collect(),
        }
    }
}

//! Feed item types for feedrelay.

use chrono::{DateTime, Utc};

/// Maximum feed size in bytes (5MB).
pub const MAX_FEED_SIZE: u64 = 5 * 1024 * 1024;

/// Title used when an entry carries none.
pub const UNTITLED: &str = "Untitled";

/// One entry as returned by a feed source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    /// Globally unique identifier as provided by the source feed.
    pub guid: String,
    /// Item title.
    pub title: String,
    /// Item link (empty if the entry has none).
    pub link: String,
    /// Publication instant (falls back to the updated instant).
    pub published_at: Option<DateTime<Utc>>,
}

impl FeedItem {
    /// Create a new item without a publication date.
    pub fn new(guid: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            guid: guid.into(),
            title: title.into(),
            link: String::new(),
            published_at: None,
        }
    }

    /// Set the link.
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = link.into();
        self
    }

    /// Set the publication instant.
    pub fn with_published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = Some(published_at);
        self
    }
}

//! Feed retrieval for feedrelay.
//!
//! This module provides the fetch capability and the item type it yields.

pub mod fetcher;
pub mod types;

pub use fetcher::{parse_feed, validate_url, FeedSource, HttpFeedSource};
pub use types::{FeedItem, MAX_FEED_SIZE, UNTITLED};

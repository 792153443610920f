//! Test helpers for run-level tests.
//!
//! Provides in-memory feed sources and notifiers so that whole runs can be
//! driven without network access.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use feedrelay::{FeedItem, FeedRecord, FeedSource, Notifier, RelayError, Result};

/// The fixed "today" used by run tests.
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
}

/// A calendar day.
pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// An instant on the given day, mid-morning UTC.
pub fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 9, 15, 0).unwrap()
}

/// A dated item with a link derived from its guid.
pub fn item(guid: &str, title: &str, published: DateTime<Utc>) -> FeedItem {
    FeedItem::new(guid, title)
        .with_link(format!("https://news.example/{guid}"))
        .with_published_at(published)
}

/// Feed source answering from a fixed table; unknown URLs fail.
#[derive(Default)]
pub struct FakeFeed {
    responses: HashMap<String, std::result::Result<Vec<FeedItem>, String>>,
    pub requested: RefCell<Vec<String>>,
}

impl FakeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `items` for `url`.
    pub fn with_items(mut self, url: &str, items: Vec<FeedItem>) -> Self {
        self.responses.insert(url.to_string(), Ok(items));
        self
    }

    /// Fail every fetch of `url` with `reason`.
    pub fn with_failure(mut self, url: &str, reason: &str) -> Self {
        self.responses.insert(url.to_string(), Err(reason.to_string()));
        self
    }
}

impl FeedSource for FakeFeed {
    async fn fetch(&self, url: &str) -> Result<Vec<FeedItem>> {
        self.requested.borrow_mut().push(url.to_string());
        match self.responses.get(url) {
            Some(Ok(items)) => Ok(items.clone()),
            Some(Err(reason)) => Err(RelayError::Fetch(reason.clone())),
            None => Err(RelayError::Fetch(format!("no such feed: {url}"))),
        }
    }
}

/// Notifier recording every record it receives.
#[derive(Default)]
pub struct RecordingNotifier {
    pub received: RefCell<Vec<FeedRecord>>,
    pub fail_ids: Vec<String>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make deliveries of `id` fail.
    pub fn failing_on(mut self, id: &str) -> Self {
        self.fail_ids.push(id.to_string());
        self
    }

    /// Ids received so far, in delivery order.
    pub fn ids(&self) -> Vec<String> {
        self.received.borrow().iter().map(|r| r.id.clone()).collect()
    }
}

impl Notifier for RecordingNotifier {
    async fn notify(&self, record: &FeedRecord) -> Result<()> {
        self.received.borrow_mut().push(record.clone());
        if self.fail_ids.contains(&record.id) {
            return Err(RelayError::Notify("sink rejected the message".to_string()));
        }
        Ok(())
    }
}

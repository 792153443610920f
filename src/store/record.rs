//! Feed record types.

use chrono::NaiveDate;

use crate::datetime::to_day;
use crate::feed::FeedItem;
use crate::store::codec::DELIMITER;

/// One entry seen from a feed, keyed by its GUID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRecord {
    /// GUID of the feed item; primary key of the store.
    pub id: String,
    /// Human readable title.
    pub title: String,
    /// Item URL. Empty for records loaded from the store, which are never
    /// dispatched again.
    pub link: String,
    /// UTC calendar day the item was published.
    pub published_at: NaiveDate,
}

impl FeedRecord {
    /// Create a new record without a link.
    pub fn new(id: impl Into<String>, title: impl Into<String>, published_at: NaiveDate) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            link: String::new(),
            published_at,
        }
    }

    /// Set the link.
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = link.into();
        self
    }

    /// Build a record from a fetched item.
    ///
    /// Returns `None` if the item carries no publication date. The title is
    /// sanitized so that the record survives a save/load cycle; the id is kept
    /// as is, callers check it with [`is_storable_id`] first.
    pub fn from_item(item: &FeedItem) -> Option<Self> {
        let published_at = to_day(item.published_at.as_ref()?);
        Some(Self {
            id: item.guid.clone(),
            title: sanitize_field(&item.title),
            link: item.link.trim().to_string(),
            published_at,
        })
    }

    /// Whether this record may be passed to the notification sink.
    pub fn is_dispatchable(&self) -> bool {
        !self.link.is_empty()
    }
}

/// Make a value safe to store on a single delimited line.
///
/// Line breaks collapse into single spaces, the field delimiter is replaced
/// by a single `|`, and a trailing `|-` loses its dash so it cannot fuse with
/// the delimiter that follows the field.
pub fn sanitize_field(value: &str) -> String {
    let flattened = value
        .split(['\r', '\n'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    let mut result = flattened.replace(DELIMITER, "|");
    // replacement may create a new delimiter, e.g. "|-|-|"
    while result.contains(DELIMITER) {
        result = result.replace(DELIMITER, "|");
    }
    if result.ends_with("|-") {
        result.pop();
    }
    result
}

/// Whether `id` can be written to a store line and read back unchanged.
///
/// Ids are primary keys and are never rewritten, so an id that would need
/// sanitizing is rejected instead.
pub fn is_storable_id(id: &str) -> bool {
    !id.is_empty() && sanitize_field(id) == id
}

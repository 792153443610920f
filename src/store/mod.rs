//! Record store for feedrelay.
//!
//! This module provides the feed record type, the keyed record collection,
//! the line codec and the persistent backends.

pub mod codec;
pub mod file;
pub mod record;
pub mod records;

pub use codec::{decode, encode, encode_record, LoadedStore, DELIMITER, FIELD_COUNT};
pub use file::{FileStore, MemoryStore, StoreBackend};
pub use record::{is_storable_id, sanitize_field, FeedRecord};
pub use records::RecordStore;

//! feedrelay - syndication feed relay
//!
//! Polls a list of feeds, remembers which entries it has already seen in a
//! flat record store, and forwards new entries to a notification webhook.

pub mod config;
pub mod datetime;
pub mod error;
pub mod feed;
pub mod logging;
pub mod merge;
pub mod notify;
pub mod retention;
pub mod runner;
pub mod sources;
pub mod store;

pub use config::Config;
pub use error::{RelayError, Result};
pub use feed::{FeedItem, FeedSource, HttpFeedSource};
pub use merge::{merge, prune, MergeOutcome};
pub use notify::{ConfiguredNotifier, DispatchReport, Dispatcher, Notifier};
pub use retention::{PolicyKind, RetentionPolicy};
pub use runner::{run, ConfiguredRunner, RunReport, Runner, SourceFailure};
pub use sources::SourceList;
pub use store::{FeedRecord, FileStore, LoadedStore, MemoryStore, RecordStore, StoreBackend};

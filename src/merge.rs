//! Merge engine.
//!
//! Combines freshly fetched items with the current store under a retention
//! policy. The first sighting of an id wins: an item whose id is already
//! stored is never re-added, which is what keeps repeated runs against an
//! unchanged feed from producing new notifications.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::datetime::format_date;
use crate::feed::FeedItem;
use crate::retention::RetentionPolicy;
use crate::store::{is_storable_id, FeedRecord, RecordStore};

/// Result of merging one batch of fetched items.
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    /// The next store state.
    pub store: RecordStore,
    /// Records inserted by this merge, in fetch order.
    pub added: Vec<FeedRecord>,
    /// Stored records dropped because they aged out.
    pub pruned: Vec<FeedRecord>,
    /// Fetched items outside the retention window.
    pub expired: usize,
    /// Fetched items without a publication date.
    pub undated: usize,
    /// Fetched items whose id cannot be stored without being altered.
    pub rejected: usize,
    /// Fetched items whose id was already present.
    pub duplicates: usize,
}

/// Drop every record that is expired as of `today`.
///
/// Returns the dropped records.
pub fn prune(store: &mut RecordStore, policy: &RetentionPolicy, today: NaiveDate) -> Vec<FeedRecord> {
    let pruned = store.retain(|record| policy.is_live(record.published_at, today));
    for record in &pruned {
        info!(
            "{} is too old, discarding - {}",
            record.title,
            format_date(&record.published_at)
        );
    }
    pruned
}

/// Merge `fetched` into `current`.
///
/// `current` is pruned first so that aged-out records neither linger nor
/// block items that have since reappeared.
pub fn merge(
    mut current: RecordStore,
    fetched: &[FeedItem],
    policy: &RetentionPolicy,
    today: NaiveDate,
) -> MergeOutcome {
    let pruned = prune(&mut current, policy, today);
    let mut outcome = MergeOutcome {
        store: current,
        pruned,
        ..Default::default()
    };

    for item in fetched {
        if !is_storable_id(&item.guid) {
            warn!("Skipping item with unstorable id {:?}: {}", item.guid, item.title);
            outcome.rejected += 1;
            continue;
        }

        let Some(record) = FeedRecord::from_item(item) else {
            warn!("Skipping item without publication date: {} ({})", item.title, item.guid);
            outcome.undated += 1;
            continue;
        };

        if policy.is_expired(record.published_at, today) {
            debug!(
                "Ignoring expired item: {} - {}",
                record.title,
                format_date(&record.published_at)
            );
            outcome.expired += 1;
            continue;
        }

        if outcome.store.insert_new(record.clone()) {
            info!(
                "Added to store: {} - {}",
                record.title,
                format_date(&record.published_at)
            );
            outcome.added.push(record);
        } else {
            debug!("Already known: {}", record.id);
            outcome.duplicates += 1;
        }
    }

    outcome
}

//! Dispatch of newly added records.

use std::time::Duration;

use tracing::{debug, error, info};

use crate::notify::webhook::Notifier;
use crate::store::FeedRecord;

/// Outcome of one dispatch pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Records delivered successfully.
    pub sent: usize,
    /// Records whose delivery failed.
    pub failed: usize,
    /// Records skipped because they have no link.
    pub skipped: usize,
}

/// Sends records to a notifier one at a time, pausing between calls to
/// respect the sink's rate limit.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    delay: Duration,
}

impl Dispatcher {
    /// Create a dispatcher that waits `delay` between two deliveries.
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Deliver every record that has a link.
    ///
    /// Records are sent oldest first. A failed delivery is logged and does
    /// not stop the remaining ones.
    pub async fn dispatch<N: Notifier>(&self, notifier: &N, records: &[FeedRecord]) -> DispatchReport {
        let mut report = DispatchReport::default();

        let mut pending: Vec<&FeedRecord> = Vec::with_capacity(records.len());
        for record in records {
            if record.is_dispatchable() {
                pending.push(record);
            } else {
                debug!("Not dispatching {}: no link", record.id);
                report.skipped += 1;
            }
        }
        pending.sort_by(|a, b| {
            a.published_at
                .cmp(&b.published_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        for (index, record) in pending.iter().enumerate() {
            if index > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            match notifier.notify(record).await {
                Ok(()) => {
                    info!("Notified: {}", record.title);
                    report.sent += 1;
                }
                Err(e) => {
                    error!("Could not notify {}: {}", record.title, e);
                    report.failed += 1;
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{RelayError, Result};
    use chrono::NaiveDate;
    use std::cell::RefCell;
    use std::time::Instant;

    #[derive(Default)]
    struct RecordingNotifier {
        calls: RefCell<Vec<String>>,
        fail_on: Option<&'static str>,
    }

    impl Notifier for RecordingNotifier {
        async fn notify(&self, record: &FeedRecord) -> Result<()> {
            self.calls.borrow_mut().push(record.id.clone());
            if self.fail_on == Some(record.id.as_str()) {
                return Err(RelayError::Notify("boom".to_string()));
            }
            Ok(())
        }
    }

    fn record(id: &str, day: u32, link: &str) -> FeedRecord {
        FeedRecord::new(id, id.to_uppercase(), NaiveDate::from_ymd_opt(2024, 5, day).unwrap())
            .with_link(link)
    }

    #[tokio::test]
    async fn test_dispatch_skips_records_without_link() {
        let notifier = RecordingNotifier::default();
        let records = vec![
            record("a", 10, "https://example.com/a"),
            record("local", 10, ""),
        ];

        let report = Dispatcher::new(Duration::ZERO)
            .dispatch(&notifier, &records)
            .await;

        assert_eq!(*notifier.calls.borrow(), vec!["a".to_string()]);
        assert_eq!(
            report,
            DispatchReport {
                sent: 1,
                failed: 0,
                skipped: 1
            }
        );
    }

    #[tokio::test]
    async fn test_dispatch_continues_after_failure() {
        let notifier = RecordingNotifier {
            fail_on: Some("a"),
            ..Default::default()
        };
        let records = vec![
            record("a", 8, "https://example.com/a"),
            record("b", 9, "https://example.com/b"),
            record("c", 10, "https://example.com/c"),
        ];

        let report = Dispatcher::new(Duration::ZERO)
            .dispatch(&notifier, &records)
            .await;

        assert_eq!(notifier.calls.borrow().len(), 3);
        assert_eq!(report.sent, 2);
        assert_eq!(report.failed, 1);
    }

    #[tokio::test]
    async fn test_dispatch_orders_oldest_first() {
        let notifier = RecordingNotifier::default();
        let records = vec![
            record("z", 10, "https://example.com/z"),
            record("b", 9, "https://example.com/b"),
            record("a", 10, "https://example.com/a"),
        ];

        Dispatcher::new(Duration::ZERO)
            .dispatch(&notifier, &records)
            .await;

        assert_eq!(*notifier.calls.borrow(), vec!["b", "a", "z"]);
    }

    #[tokio::test]
    async fn test_dispatch_waits_between_calls() {
        let notifier = RecordingNotifier::default();
        let records = vec![
            record("a", 9, "https://example.com/a"),
            record("b", 10, "https://example.com/b"),
        ];

        let started = Instant::now();
        Dispatcher::new(Duration::from_millis(50))
            .dispatch(&notifier, &records)
            .await;

        // one pause between two calls, none after the last
        assert!(started.elapsed() >= Duration::from_millis(50));
        assert_eq!(notifier.calls.borrow().len(), 2);
    }

    #[tokio::test]
    async fn test_dispatch_nothing() {
        let notifier = RecordingNotifier::default();
        let report = Dispatcher::new(Duration::from_secs(60))
            .dispatch(&notifier, &[])
            .await;
        assert_eq!(report, DispatchReport::default());
    }
}

//! Run orchestration.
//!
//! One run loads the store, polls every source in order, merges what they
//! return, dispatches the records that are new, and persists the result.
//! A failing source only costs that source; unreadable or unwritable state
//! aborts the run.

use std::time::Duration;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::datetime::format_date;
use crate::error::{RelayError, Result};
use crate::feed::{FeedItem, FeedSource, HttpFeedSource};
use crate::merge::{merge, prune};
use crate::notify::{ConfiguredNotifier, DispatchReport, Dispatcher, Notifier};
use crate::retention::RetentionPolicy;
use crate::sources::SourceList;
use crate::store::{FeedRecord, FileStore, StoreBackend};

/// Default per-source fetch timeout in seconds.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 120;

/// A source that could not be polled during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFailure {
    /// Source URL.
    pub url: String,
    /// Why the fetch failed.
    pub reason: String,
}

/// Summary of one run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Number of sources polled.
    pub sources: usize,
    /// Sources that failed.
    pub failures: Vec<SourceFailure>,
    /// Records added during this run.
    pub added: Vec<FeedRecord>,
    /// Stored records dropped because they aged out.
    pub pruned: usize,
    /// Malformed store lines skipped while loading.
    pub skipped_lines: usize,
    /// Number of records in the persisted store.
    pub stored: usize,
    /// Whether the store file was rewritten.
    pub saved: bool,
    /// Dispatch outcome.
    pub dispatch: DispatchReport,
}

/// Sequences fetch, merge, dispatch and persistence for one run.
pub struct Runner<F, N, B> {
    fetcher: F,
    notifier: N,
    backend: B,
    policy: RetentionPolicy,
    fetch_timeout: Duration,
    source_delay: Duration,
    dispatcher: Dispatcher,
}

impl<F, N, B> Runner<F, N, B>
where
    F: FeedSource,
    N: Notifier,
    B: StoreBackend,
{
    /// Create a runner with no pauses and the default fetch timeout.
    pub fn new(fetcher: F, notifier: N, backend: B, policy: RetentionPolicy) -> Self {
        Self {
            fetcher,
            notifier,
            backend,
            policy,
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            source_delay: Duration::ZERO,
            dispatcher: Dispatcher::new(Duration::ZERO),
        }
    }

    /// Set the per-source fetch timeout.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Set the pause between two sources.
    pub fn with_source_delay(mut self, delay: Duration) -> Self {
        self.source_delay = delay;
        self
    }

    /// Set the pause between two notifications.
    pub fn with_dispatch_delay(mut self, delay: Duration) -> Self {
        self.dispatcher = Dispatcher::new(delay);
        self
    }

    /// Get the feed source.
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Get the notifier.
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Get the storage backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Execute one run against `sources` with `today` as the current day.
    pub async fn run(&self, sources: &SourceList, today: NaiveDate) -> Result<RunReport> {
        info!(
            "Run started for {} ({} retention, {} source(s))",
            format_date(&today),
            self.policy.name(),
            sources.len()
        );

        let loaded = self.backend.load()?;
        let last_written = loaded.last_written;
        let mut store = loaded.store;
        let mut report = RunReport {
            sources: sources.len(),
            skipped_lines: loaded.skipped,
            ..Default::default()
        };
        report.pruned = prune(&mut store, &self.policy, today).len();

        for (index, url) in sources.iter().enumerate() {
            if index > 0 && !self.source_delay.is_zero() {
                tokio::time::sleep(self.source_delay).await;
            }

            debug!("Fetching {}", url);
            let items = match self.fetch(url).await {
                Ok(items) => items,
                Err(e) => {
                    warn!("Could not retrieve feed {}: {}", url, e);
                    report.failures.push(SourceFailure {
                        url: url.to_string(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let outcome = merge(store, &items, &self.policy, today);
            info!(
                "{}: {} item(s), {} new, {} known, {} expired, {} undated, {} rejected",
                url,
                items.len(),
                outcome.added.len(),
                outcome.duplicates,
                outcome.expired,
                outcome.undated,
                outcome.rejected
            );
            store = outcome.store;
            report.pruned += outcome.pruned.len();
            report.added.extend(outcome.added);
        }

        report.dispatch = self.dispatcher.dispatch(&self.notifier, &report.added).await;

        let unchanged = report.added.is_empty() && report.pruned == 0 && report.skipped_lines == 0;
        if unchanged && last_written == Some(today) {
            debug!("Store unchanged since today's last write, not rewriting");
        } else {
            self.backend.save(&store, today)?;
            report.saved = true;
        }
        report.stored = store.len();

        info!(
            "Run finished: {} new, {} sent, {} failed notification(s), {} failed source(s), {} stored",
            report.added.len(),
            report.dispatch.sent,
            report.dispatch.failed,
            report.failures.len(),
            report.stored
        );

        Ok(report)
    }

    /// Fetch one source, bounded by the fetch timeout.
    async fn fetch(&self, url: &str) -> Result<Vec<FeedItem>> {
        match tokio::time::timeout(self.fetch_timeout, self.fetcher.fetch(url)).await {
            Ok(result) => result,
            Err(_) => Err(RelayError::Fetch(format!(
                "timed out after {:?}",
                self.fetch_timeout
            ))),
        }
    }
}

/// Runner wired to HTTP fetching, the configured notifier and the file store.
pub type ConfiguredRunner = Runner<HttpFeedSource, ConfiguredNotifier, FileStore>;

impl ConfiguredRunner {
    /// Build a runner from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher = HttpFeedSource::new(&config.fetch)?;
        let notifier = ConfiguredNotifier::from_config(&config.notify)?;
        if !notifier.is_live() {
            info!("No webhook configured, running in dry mode");
        }
        let backend = FileStore::new(&config.paths.store);

        Ok(Runner::new(fetcher, notifier, backend, config.retention.to_policy())
            .with_fetch_timeout(Duration::from_secs(config.fetch.timeout_secs))
            .with_source_delay(Duration::from_secs(config.fetch.source_delay_secs))
            .with_dispatch_delay(Duration::from_secs(config.notify.delay_secs)))
    }
}

/// Load the source list named in `config` and execute one run.
pub async fn run(config: &Config, today: NaiveDate) -> Result<RunReport> {
    let sources = SourceList::load(&config.paths.sources)?;
    let runner = ConfiguredRunner::from_config(config)?;
    runner.run(&sources, today).await
}

//! Notification sinks.
//!
//! [`Notifier`] is the capability the dispatcher uses to deliver one record.
//! [`WebhookNotifier`] posts a chat-style JSON message to a webhook endpoint
//! and treats `204 No Content` as success; [`DryRunNotifier`] only logs.

use std::future::Future;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde_json::json;
use tracing::info;

use crate::config::NotifyConfig;
use crate::datetime::format_date;
use crate::error::{RelayError, Result};
use crate::store::FeedRecord;

/// Something that can deliver a record to the outside world.
pub trait Notifier {
    /// Deliver one record.
    fn notify(&self, record: &FeedRecord) -> impl Future<Output = Result<()>>;
}

/// Render the message line for a record: `[title](link) - YYYY-MM-DD`.
pub fn render_message(record: &FeedRecord) -> String {
    format!(
        "[{}]({}) - {}",
        record.title,
        record.link,
        format_date(&record.published_at)
    )
}

/// Build the JSON payload for a record.
pub fn build_payload(record: &FeedRecord) -> serde_json::Value {
    json!({ "content": render_message(record) })
}

/// Webhook notifier.
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    /// Create a notifier posting to `url`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RelayError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self::with_client(url, client))
    }

    /// Create a notifier using a preconfigured HTTP client.
    pub fn with_client(url: impl Into<String>, client: Client) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Create a notifier from the notification configuration.
    pub fn from_config(config: &NotifyConfig) -> Result<Self> {
        Self::new(
            config.webhook_url.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }
}

impl Notifier for WebhookNotifier {
    async fn notify(&self, record: &FeedRecord) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .body(build_payload(record).to_string())
            .send()
            .await
            .map_err(|e| RelayError::Notify(format!("could not reach webhook: {}", e)))?;

        let status = response.status();
        if status != StatusCode::NO_CONTENT {
            return Err(RelayError::Notify(format!(
                "unexpected response status: {}",
                status
            )));
        }

        Ok(())
    }
}

/// Notifier used when no endpoint is configured.
#[derive(Debug, Default)]
pub struct DryRunNotifier;

impl Notifier for DryRunNotifier {
    async fn notify(&self, record: &FeedRecord) -> Result<()> {
        info!("[dry run] {}", render_message(record));
        Ok(())
    }
}

/// The notifier selected by configuration: live webhook or dry run.
pub enum ConfiguredNotifier {
    /// Post to the configured webhook.
    Webhook(WebhookNotifier),
    /// Only log what would have been sent.
    DryRun(DryRunNotifier),
}

impl ConfiguredNotifier {
    /// Select the notifier for the given configuration.
    pub fn from_config(config: &NotifyConfig) -> Result<Self> {
        if config.is_live() {
            Ok(Self::Webhook(WebhookNotifier::from_config(config)?))
        } else {
            Ok(Self::DryRun(DryRunNotifier))
        }
    }

    /// Whether notifications actually leave the process.
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Webhook(_))
    }
}

impl Notifier for ConfiguredNotifier {
    async fn notify(&self, record: &FeedRecord) -> Result<()> {
        match self {
            Self::Webhook(notifier) => notifier.notify(record).await,
            Self::DryRun(notifier) => notifier.notify(record).await,
        }
    }
}

//! Configuration module for feedrelay.

use serde::Deserialize;
use std::path::Path;

use crate::retention::{
    PolicyKind, RetentionPolicy, DEFAULT_FUTURE_TOLERANCE_DAYS, DEFAULT_WINDOW_DAYS,
};
use crate::{RelayError, Result};

/// Default configuration file name.
pub const DEFAULT_CONFIG_PATH: &str = "feedrelay.toml";

/// File locations.
#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    /// Path to the newline-delimited source list.
    #[serde(default = "default_sources_path")]
    pub sources: String,
    /// Path to the record store file.
    #[serde(default = "default_store_path")]
    pub store: String,
}

fn default_sources_path() -> String {
    "sources.txt".to_string()
}

fn default_store_path() -> String {
    "db.txt".to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            sources: default_sources_path(),
            store: default_store_path(),
        }
    }
}

/// Retention configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RetentionConfig {
    /// Retention semantics (rolling / same_day).
    #[serde(default = "default_policy_kind")]
    pub policy: PolicyKind,
    /// Length of the rolling window in days.
    #[serde(default = "default_window_days")]
    pub window_days: u32,
    /// How many days into the future an item may be dated.
    #[serde(default = "default_future_tolerance_days")]
    pub future_tolerance_days: u32,
}

fn default_policy_kind() -> PolicyKind {
    PolicyKind::Rolling
}

fn default_window_days() -> u32 {
    DEFAULT_WINDOW_DAYS
}

fn default_future_tolerance_days() -> u32 {
    DEFAULT_FUTURE_TOLERANCE_DAYS
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            policy: default_policy_kind(),
            window_days: default_window_days(),
            future_tolerance_days: default_future_tolerance_days(),
        }
    }
}

impl RetentionConfig {
    /// Build the retention policy in force.
    pub fn to_policy(&self) -> RetentionPolicy {
        match self.policy {
            PolicyKind::SameDay => RetentionPolicy::SameDay,
            PolicyKind::Rolling => RetentionPolicy::Rolling {
                window_days: self.window_days,
                future_tolerance_days: self.future_tolerance_days,
            },
        }
    }
}

/// Feed fetching configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Total per-source timeout in seconds.
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Maximum number of redirects.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    /// Maximum feed size in bytes.
    #[serde(default = "default_max_feed_size")]
    pub max_feed_size_bytes: u64,
    /// Pause between two sources in seconds.
    #[serde(default = "default_source_delay")]
    pub source_delay_secs: u64,
    /// User agent sent with each request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_fetch_timeout() -> u64 {
    120
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_max_redirects() -> usize {
    5
}

fn default_max_feed_size() -> u64 {
    crate::feed::MAX_FEED_SIZE
}

fn default_source_delay() -> u64 {
    2
}

fn default_user_agent() -> String {
    concat!("feedrelay/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            max_redirects: default_max_redirects(),
            max_feed_size_bytes: default_max_feed_size(),
            source_delay_secs: default_source_delay(),
            user_agent: default_user_agent(),
        }
    }
}

/// Notification configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct NotifyConfig {
    /// Webhook endpoint. Empty means dry mode: records are only logged.
    #[serde(default)]
    pub webhook_url: String,
    /// Pause between two notifications in seconds.
    #[serde(default = "default_notify_delay")]
    pub delay_secs: u64,
    /// Request timeout in seconds.
    #[serde(default = "default_notify_timeout")]
    pub timeout_secs: u64,
}

fn default_notify_delay() -> u64 {
    2
}

fn default_notify_timeout() -> u64 {
    30
}

/// Upper bound for the notification delay.
const MAX_NOTIFY_DELAY_SECS: u64 = 3600;

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            delay_secs: default_notify_delay(),
            timeout_secs: default_notify_timeout(),
        }
    }
}

impl NotifyConfig {
    /// Whether notifications are actually sent.
    pub fn is_live(&self) -> bool {
        !self.webhook_url.is_empty()
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Write the log to `file` instead of the console.
    #[serde(default)]
    pub debug: bool,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs.txt".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            debug: false,
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// File locations.
    #[serde(default)]
    pub paths: PathsConfig,
    /// Retention configuration.
    #[serde(default)]
    pub retention: RetentionConfig,
    /// Fetch configuration.
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Notification configuration.
    #[serde(default)]
    pub notify: NotifyConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(RelayError::Io)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| RelayError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables (empty values are ignored):
    /// - `WEBHOOK`: webhook endpoint, enables live notifications
    /// - `DEBUG`: boolean, redirects the log to the log file
    /// - `FEEDRELAY_STORE`: record store path
    /// - `FEEDRELAY_SOURCES`: source list path
    pub fn apply_env_overrides(&mut self) {
        if let Some(webhook) = non_empty_env("WEBHOOK") {
            self.notify.webhook_url = webhook;
        }
        if let Some(debug) = non_empty_env("DEBUG") {
            // unparsable values leave the setting untouched
            if let Some(debug) = parse_bool(&debug) {
                self.logging.debug = debug;
            }
        }
        if let Some(store) = non_empty_env("FEEDRELAY_STORE") {
            self.paths.store = store;
        }
        if let Some(sources) = non_empty_env("FEEDRELAY_SOURCES") {
            self.paths.sources = sources;
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - the rolling window is zero days long
    /// - the fetch timeout is zero
    /// - the webhook URL is set but is not an http(s) URL
    /// - the notification delay exceeds one hour
    pub fn validate(&self) -> Result<()> {
        if self.retention.policy == PolicyKind::Rolling && self.retention.window_days == 0 {
            return Err(RelayError::Validation(
                "retention.window_days must be at least 1".to_string(),
            ));
        }

        if self.fetch.timeout_secs == 0 {
            return Err(RelayError::Validation(
                "fetch.timeout_secs must be at least 1".to_string(),
            ));
        }

        if self.notify.is_live() {
            let url = url::Url::parse(&self.notify.webhook_url)
                .map_err(|e| RelayError::Validation(format!("invalid webhook URL: {e}")))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(RelayError::Validation(format!(
                    "unsupported webhook URL scheme: {}",
                    url.scheme()
                )));
            }
        }

        if self.notify.delay_secs > MAX_NOTIFY_DELAY_SECS {
            return Err(RelayError::Validation(format!(
                "notify.delay_secs must not exceed {MAX_NOTIFY_DELAY_SECS}"
            )));
        }

        Ok(())
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Parse a boolean switch (`1`, `t`, `true`, `0`, `f`, `false`, any case).
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "t" | "true" => Some(true),
        "0" | "f" | "false" => Some(false),
        _ => None,
    }
}

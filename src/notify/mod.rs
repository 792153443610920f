//! Notification delivery for feedrelay.
//!
//! This module provides the notifier capability, its webhook and dry-run
//! implementations, and the dispatcher that drives them.

pub mod dispatch;
pub mod webhook;

pub use dispatch::{DispatchReport, Dispatcher};
pub use webhook::{
    build_payload, render_message, ConfiguredNotifier, DryRunNotifier, Notifier, WebhookNotifier,
};

//! Retention policy.
//!
//! Decides whether a record dated on a given day is still live relative to
//! "today". The caller captures today once per run and passes it to every
//! check, so a single run never straddles two different notions of now.

use chrono::{Days, NaiveDate};
use serde::Deserialize;

/// Default rolling window length in days.
pub const DEFAULT_WINDOW_DAYS: u32 = 7;

/// Default tolerance for items dated in the future, in days.
pub const DEFAULT_FUTURE_TOLERANCE_DAYS: u32 = 1;

/// Which retention semantics are in force for a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// Only records dated today are live.
    SameDay,
    /// Records within a rolling window of days are live.
    Rolling,
}

/// The temporal window that determines whether a record is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionPolicy {
    /// Expired unless dated on the same UTC calendar day as today.
    SameDay,
    /// Expired unless `today - window_days < date <= today + future_tolerance_days`.
    Rolling {
        window_days: u32,
        future_tolerance_days: u32,
    },
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        RetentionPolicy::rolling(DEFAULT_WINDOW_DAYS)
    }
}

impl RetentionPolicy {
    /// Rolling window with the default future tolerance.
    pub fn rolling(window_days: u32) -> Self {
        RetentionPolicy::Rolling {
            window_days,
            future_tolerance_days: DEFAULT_FUTURE_TOLERANCE_DAYS,
        }
    }

    /// Check whether a record dated `date` has aged out as of `today`.
    pub fn is_expired(&self, date: NaiveDate, today: NaiveDate) -> bool {
        match *self {
            RetentionPolicy::SameDay => date != today,
            RetentionPolicy::Rolling {
                window_days,
                future_tolerance_days,
            } => {
                // A bound that falls off the calendar does not constrain anything.
                let after_floor = today
                    .checked_sub_days(Days::new(u64::from(window_days)))
                    .map_or(true, |floor| date > floor);
                let before_ceiling = today
                    .checked_add_days(Days::new(u64::from(future_tolerance_days)))
                    .map_or(true, |ceiling| date <= ceiling);
                !(after_floor && before_ceiling)
            }
        }
    }

    /// Inverse of [`is_expired`](Self::is_expired).
    pub fn is_live(&self, date: NaiveDate, today: NaiveDate) -> bool {
        !self.is_expired(date, today)
    }

    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            RetentionPolicy::SameDay => "same-day",
            RetentionPolicy::Rolling { .. } => "rolling",
        }
    }
}

//! The payload returned to callers.

use super::window::{ContributionDay, ContributionWindow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Message of the error payload.
pub const FAILURE_MESSAGE: &str = "Failed to fetch GitHub contributions";

/// Aggregated contribution calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionReport {
    /// 365 days, oldest first.
    pub contributions: Vec<ContributionDay>,
    /// Sum over the window.
    pub total_contributions: u64,
    /// Sum over the window's days in the current calendar year.
    pub current_year_contributions: u64,
    /// When the report was computed.
    pub last_updated: DateTime<Utc>,
    /// Whether a credential was used.
    pub authenticated: bool,
}

impl ContributionReport {
    /// Builds the report from a finished window.
    pub fn from_window(window: ContributionWindow, last_updated: DateTime<Utc>, authenticated: bool) -> Self {
        let total_contributions = window.total();
        let current_year_contributions = window.current_year_total();

        Self {
            contributions: window.into_days(),
            total_contributions,
            current_year_contributions,
            last_updated,
            authenticated,
        }
    }
}

/// Payload sent when aggregation could not produce a report at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureReport {
    /// Human readable failure message.
    pub error: String,
    /// Always empty.
    pub contributions: Vec<ContributionDay>,
    /// Always zero.
    pub total_contributions: u64,
    /// Always zero.
    pub current_year_contributions: u64,
}

impl Default for FailureReport {
    fn default() -> Self {
        Self {
            error: FAILURE_MESSAGE.to_string(),
            contributions: Vec::new(),
            total_contributions: 0,
            current_year_contributions: 0,
        }
    }
}

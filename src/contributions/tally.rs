//! Per-day commit counts gathered by one aggregation run.

use super::window::WindowBounds;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeMap;

/// Commit counts keyed by UTC calendar day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitTally {
    days: BTreeMap<NaiveDate, u32>,
}

impl CommitTally {
    /// Creates an empty tally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `n` to a day.
    pub fn add(&mut self, date: NaiveDate, n: u32) {
        let count = self.days.entry(date).or_insert(0);
        *count = count.saturating_add(n);
    }

    /// Counts one commit on the UTC day of `ts`.
    pub fn record(&mut self, ts: DateTime<Utc>) {
        self.add(ts.date_naive(), 1);
    }

    /// Counts one commit if `ts` lies inside the bounds.
    pub fn record_within(&mut self, bounds: &WindowBounds, ts: DateTime<Utc>) -> bool {
        if bounds.contains(ts) {
            self.record(ts);
            true
        } else {
            false
        }
    }

    /// Adds every day of another tally.
    pub fn merge(&mut self, other: CommitTally) {
        for (date, count) in other.days {
            self.add(date, count);
        }
    }

    /// Count for one day.
    pub fn get(&self, date: NaiveDate) -> u32 {
        self.days.get(&date).copied().unwrap_or(0)
    }

    /// Days and counts in ascending date order.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, u32)> + '_ {
        self.days.iter().map(|(date, count)| (*date, *count))
    }

    /// Total commits.
    pub fn total(&self) -> u64 {
        self.days.values().map(|c| u64::from(*c)).sum()
    }

    /// Returns true if no commit was counted.
    pub fn is_empty(&self) -> bool {
        self.days.values().all(|c| *c == 0)
    }
}

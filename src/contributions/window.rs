//! The trailing 365-day calendar window.

use super::tally::CommitTally;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of days in the window, today included.
pub const WINDOW_DAYS: usize = 365;

/// One calendar day of the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionDay {
    /// UTC calendar date, serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
    /// Contributions counted on that day.
    pub count: u32,
}

/// Instants and dates delimiting the window.
///
/// `since` is midnight UTC of the first day and `until` is 23:59:59 UTC of
/// the last day; both are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowBounds {
    /// First day (today minus 364 days).
    pub start: NaiveDate,
    /// Last day (today).
    pub end: NaiveDate,
    /// Start of the first day.
    pub since: DateTime<Utc>,
    /// Last second of the last day.
    pub until: DateTime<Utc>,
}

impl WindowBounds {
    /// Bounds of the window whose last day is `today`.
    pub fn ending_on(today: NaiveDate) -> Self {
        let start = today - Duration::days(WINDOW_DAYS as i64 - 1);
        let since = start.and_time(NaiveTime::MIN).and_utc();
        let until = today.and_time(NaiveTime::MIN).and_utc() + Duration::seconds(86_399);

        Self {
            start,
            end: today,
            since,
            until,
        }
    }

    /// Bounds of the window containing `now` as its last day.
    pub fn ending_at(now: DateTime<Utc>) -> Self {
        Self::ending_on(now.date_naive())
    }

    /// Returns true if the instant falls inside the window.
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.since && ts <= self.until
    }

    /// Returns true if the date is one of the window's days.
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// January 1st of the year of the last day.
    pub fn year_start(&self) -> NaiveDate {
        self.end - Duration::days(i64::from(self.end.ordinal0()))
    }
}

/// Exactly [`WINDOW_DAYS`] contiguous days in ascending order, zero-filled at
/// construction. Counts only ever grow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContributionWindow {
    bounds: WindowBounds,
    days: Vec<ContributionDay>,
}

impl ContributionWindow {
    /// Creates a zero-filled window.
    pub fn new(bounds: WindowBounds) -> Self {
        let days = bounds
            .start
            .iter_days()
            .take(WINDOW_DAYS)
            .map(|date| ContributionDay { date, count: 0 })
            .collect();

        Self { bounds, days }
    }

    /// Gets the bounds.
    pub fn bounds(&self) -> &WindowBounds {
        &self.bounds
    }

    /// Gets the days, oldest first.
    pub fn days(&self) -> &[ContributionDay] {
        &self.days
    }

    /// Consumes the window and returns the days.
    pub fn into_days(self) -> Vec<ContributionDay> {
        self.days
    }

    fn index_of(&self, date: NaiveDate) -> Option<usize> {
        if !self.bounds.contains_date(date) {
            return None;
        }
        usize::try_from((date - self.bounds.start).num_days()).ok()
    }

    /// Adds `n` to a day. Dates outside the window are ignored and reported
    /// with `false`.
    pub fn add(&mut self, date: NaiveDate, n: u32) -> bool {
        match self.index_of(date).and_then(|i| self.days.get_mut(i)) {
            Some(day) => {
                day.count = day.count.saturating_add(n);
                true
            }
            None => false,
        }
    }

    /// Adds every day of a tally.
    pub fn add_tally(&mut self, tally: &CommitTally) {
        for (date, count) in tally.iter() {
            self.add(date, count);
        }
    }

    /// Count for one day, `None` outside the window.
    pub fn count_on(&self, date: NaiveDate) -> Option<u32> {
        self.index_of(date)
            .and_then(|i| self.days.get(i))
            .map(|day| day.count)
    }

    /// Sum of all days.
    pub fn total(&self) -> u64 {
        self.days.iter().map(|day| u64::from(day.count)).sum()
    }

    /// Sum of the days on or after `from`.
    pub fn total_since(&self, from: NaiveDate) -> u64 {
        self.days
            .iter()
            .filter(|day| day.date >= from)
            .map(|day| u64::from(day.count))
            .sum()
    }

    /// Sum of the days in the calendar year of the last day.
    pub fn current_year_total(&self) -> u64 {
        self.total_since(self.bounds.year_start())
    }
}

//! Contribution calendar aggregation.
//!
//! The aggregator combines three signals over a trailing 365-day UTC window:
//! commit search, a per-repository commit listing used when search is
//! unusable, and qualifying activity events.

mod aggregator;
mod report;
mod signal;
mod tally;
mod universe;
mod window;

pub use aggregator::ContributionAggregator;
pub use report::{ContributionReport, FailureReport, FAILURE_MESSAGE};
pub use signal::{CommitSignal, SearchFailure};
pub use tally::CommitTally;
pub use universe::{RepositoryId, RepositoryUniverse};
pub use window::{ContributionDay, ContributionWindow, WindowBounds, WINDOW_DAYS};

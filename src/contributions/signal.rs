//! Outcome of the commit search step.

use super::tally::CommitTally;
use crate::errors::GitHubError;
use std::fmt;

/// Why the commit search result cannot be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchFailure {
    /// The search API refused the query (403, 422 or a rate limit).
    Rejected {
        /// HTTP status, when the refusal came from the server.
        status: Option<u16>,
    },
    /// The search ran but found nothing in the window.
    Empty,
    /// A transient failure before anything was tallied.
    Unavailable(String),
}

impl fmt::Display for SearchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected { status: Some(status) } => write!(f, "rejected (HTTP {})", status),
            Self::Rejected { status: None } => write!(f, "rejected"),
            Self::Empty => write!(f, "no commits found"),
            Self::Unavailable(message) => write!(f, "unavailable: {}", message),
        }
    }
}

/// Result of the primary commit signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitSignal {
    /// The search tally stands, possibly partial after a transient failure.
    SearchSucceeded(CommitTally),
    /// The search tally is discarded and repository enumeration replaces it.
    SearchFailed(SearchFailure),
}

impl CommitSignal {
    /// Classifies a finished search walk.
    ///
    /// A rejection discards even a non-empty tally. Otherwise an empty tally
    /// fails and a non-empty one succeeds, whatever ended the walk.
    pub fn from_search(tally: CommitTally, error: Option<&GitHubError>) -> Self {
        match error {
            Some(e) if e.triggers_search_fallback() => Self::SearchFailed(SearchFailure::Rejected {
                status: e.status_code(),
            }),
            Some(e) if tally.is_empty() => {
                Self::SearchFailed(SearchFailure::Unavailable(e.message().to_string()))
            }
            _ if tally.is_empty() => Self::SearchFailed(SearchFailure::Empty),
            _ => Self::SearchSucceeded(tally),
        }
    }

    /// Returns true if repository enumeration must run.
    pub fn needs_fallback(&self) -> bool {
        matches!(self, Self::SearchFailed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::GitHubErrorKind;
    use chrono::NaiveDate;

    fn tally_with(n: u32) -> CommitTally {
        let mut tally = CommitTally::new();
        if n > 0 {
            tally.add(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), n);
        }
        tally
    }

    #[test]
    fn test_rejection_discards_partial_tally() {
        let error = GitHubError::from_response(422, "Validation Failed".into(), None, None);
        let signal = CommitSignal::from_search(tally_with(4), Some(&error));
        assert_eq!(
            signal,
            CommitSignal::SearchFailed(SearchFailure::Rejected { status: Some(422) })
        );
        assert!(signal.needs_fallback());
    }

    #[test]
    fn test_transient_failure_keeps_partial_tally() {
        let error = GitHubError::new(GitHubErrorKind::BadGateway, "upstream").with_status(502);
        let signal = CommitSignal::from_search(tally_with(4), Some(&error));
        assert_eq!(signal, CommitSignal::SearchSucceeded(tally_with(4)));
        assert!(!signal.needs_fallback());
    }

    #[test]
    fn test_transient_failure_with_nothing_tallied() {
        let error = GitHubError::timeout("slow");
        let signal = CommitSignal::from_search(CommitTally::new(), Some(&error));
        assert_eq!(
            signal,
            CommitSignal::SearchFailed(SearchFailure::Unavailable("slow".to_string()))
        );
    }

    #[test]
    fn test_empty_search() {
        assert_eq!(
            CommitSignal::from_search(CommitTally::new(), None),
            CommitSignal::SearchFailed(SearchFailure::Empty)
        );
    }
}

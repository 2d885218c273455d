//! Data types for the GitHub endpoints the aggregator reads.
//!
//! Only the fields the aggregator needs are modelled; everything else in the
//! payloads is ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// GitHub repository (minimal representation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    /// Full name (owner/repo).
    pub full_name: String,
    /// Repository name.
    #[serde(default)]
    pub name: String,
    /// Whether the repository is private.
    #[serde(default)]
    pub private: bool,
    /// Whether the repository is a fork.
    #[serde(default)]
    pub fork: bool,
}

/// A commit as returned by the commit listing and commit search endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    /// Commit SHA.
    pub sha: String,
    /// Git-level commit details.
    pub commit: CommitDetails,
    /// Repository (present on search results only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<Repository>,
}

impl Commit {
    /// Author date of the commit, if the payload carried one.
    pub fn authored_at(&self) -> Option<DateTime<Utc>> {
        self.commit.author.as_ref().map(|a| a.date)
    }
}

/// Commit details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitDetails {
    /// Author signature.
    #[serde(default)]
    pub author: Option<CommitSignature>,
    /// Committer signature.
    #[serde(default)]
    pub committer: Option<CommitSignature>,
    /// Commit message.
    #[serde(default)]
    pub message: String,
}

/// Author/committer signature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitSignature {
    /// Name.
    #[serde(default)]
    pub name: String,
    /// Email.
    #[serde(default)]
    pub email: String,
    /// Date.
    pub date: DateTime<Utc>,
}

/// Search result envelope for commits.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchCommitsResult {
    /// Total count.
    pub total_count: u64,
    /// Whether results were truncated.
    #[serde(default)]
    pub incomplete_results: bool,
    /// Matching commits.
    #[serde(default)]
    pub items: Vec<Commit>,
}

/// An entry of a user's activity event stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Event ID.
    pub id: String,
    /// Event type, e.g. `PushEvent`.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Repository the event happened in.
    pub repo: EventRepo,
    /// Type-specific payload.
    #[serde(default)]
    pub payload: EventPayload,
    /// Whether the event is public.
    #[serde(default)]
    pub public: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Repository reference inside an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRepo {
    /// Full name (owner/repo).
    pub name: String,
}

/// The payload fields used to classify an event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventPayload {
    /// Action for pull request, issue and release events.
    #[serde(default)]
    pub action: Option<String>,
    /// Created ref type for create events (`repository`, `branch`, `tag`).
    #[serde(default)]
    pub ref_type: Option<String>,
}

/// Classified event type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// `PullRequestEvent`.
    PullRequest,
    /// `IssuesEvent`.
    Issues,
    /// `CreateEvent`.
    Create,
    /// `ReleaseEvent`.
    Release,
    /// `PushEvent`.
    Push,
    /// Anything else.
    Other(String),
}

impl From<&str> for EventKind {
    fn from(event_type: &str) -> Self {
        match event_type {
            "PullRequestEvent" => Self::PullRequest,
            "IssuesEvent" => Self::Issues,
            "CreateEvent" => Self::Create,
            "ReleaseEvent" => Self::Release,
            "PushEvent" => Self::Push,
            other => Self::Other(other.to_string()),
        }
    }
}

impl Event {
    /// Classifies the event type.
    pub fn kind(&self) -> EventKind {
        EventKind::from(self.event_type.as_str())
    }

    /// Returns true for the non-commit actions counted as contributions:
    /// pull request opened, issue opened, repository created and release
    /// published.
    pub fn is_qualifying_contribution(&self) -> bool {
        let action = self.payload.action.as_deref();
        match self.kind() {
            EventKind::PullRequest | EventKind::Issues => action == Some("opened"),
            EventKind::Create => self.payload.ref_type.as_deref() == Some("repository"),
            EventKind::Release => action == Some("published"),
            EventKind::Push | EventKind::Other(_) => false,
        }
    }
}

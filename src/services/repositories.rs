//! Repository operations.

use crate::client::GitHubClient;
use crate::errors::GitHubResult;
use crate::pagination::{Page, PaginationParams};
use crate::types::{Commit, Repository};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

/// Service for repository operations.
pub struct RepositoriesService<'a> {
    client: &'a GitHubClient,
}

impl<'a> RepositoriesService<'a> {
    /// Creates a new repositories service.
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Lists public repositories of a user, one page at a time.
    pub async fn list_for_user_page(
        &self,
        username: &str,
        params: &ListReposParams,
        pagination: &PaginationParams,
    ) -> GitHubResult<Page<Repository>> {
        self.client
            .get_page(&format!("/users/{}/repos", username), params, pagination)
            .await
    }

    /// Lists repositories the authenticated user can access, including
    /// private and collaborator repositories.
    pub async fn list_for_authenticated_user_page(
        &self,
        params: &ListReposParams,
        pagination: &PaginationParams,
    ) -> GitHubResult<Page<Repository>> {
        self.client.get_page("/user/repos", params, pagination).await
    }

    /// Lists commits of a repository.
    pub async fn list_commits_page(
        &self,
        full_name: &str,
        params: &CommitListParams,
        pagination: &PaginationParams,
    ) -> GitHubResult<Page<Commit>> {
        self.client
            .get_page(&format!("/repos/{}/commits", full_name), params, pagination)
            .await
    }
}

/// Parameters for listing repositories.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListReposParams {
    /// Type filter.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub repo_type: Option<RepoType>,
    /// Sort field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<RepoSort>,
}

impl ListReposParams {
    /// Every repository type, most recently updated first.
    pub fn all_recently_updated() -> Self {
        Self {
            repo_type: Some(RepoType::All),
            sort: Some(RepoSort::Updated),
        }
    }
}

/// Repository type filter.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RepoType {
    All,
    Owner,
    Public,
    Private,
    Member,
}

/// Repository sort field.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RepoSort {
    Created,
    Updated,
    Pushed,
    FullName,
}

/// Parameters for listing commits.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CommitListParams {
    /// GitHub login or email of the commit author.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Only commits after this time.
    #[serde(serialize_with = "serialize_timestamp", skip_serializing_if = "Option::is_none")]
    pub since: Option<DateTime<Utc>>,
    /// Only commits before this time.
    #[serde(serialize_with = "serialize_timestamp", skip_serializing_if = "Option::is_none")]
    pub until: Option<DateTime<Utc>>,
}

impl CommitListParams {
    /// Commits by `author` within `since..=until`.
    pub fn authored_between(author: &str, since: DateTime<Utc>, until: DateTime<Utc>) -> Self {
        Self {
            author: Some(author.to_string()),
            since: Some(since),
            until: Some(until),
        }
    }
}

fn serialize_timestamp<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(ts) => serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Secs, true)),
        None => serializer.serialize_none(),
    }
}

//! GitHub Search API operations.

use crate::client::GitHubClient;
use crate::errors::GitHubResult;
use crate::pagination::{Page, PaginationParams};
use crate::types::Commit;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// Service for search operations.
pub struct SearchService<'a> {
    client: &'a GitHubClient,
}

impl<'a> SearchService<'a> {
    /// Creates a new search service.
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Fetches one page of commit search results.
    pub async fn commits_page(
        &self,
        params: &SearchCommitsParams,
        pagination: &PaginationParams,
    ) -> GitHubResult<Page<Commit>> {
        self.client
            .get_search_page("/search/commits", params, pagination)
            .await
    }
}

/// Parameters for searching commits.
#[derive(Debug, Clone, Serialize)]
pub struct SearchCommitsParams {
    /// Search query.
    pub q: String,
    /// Sort field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<CommitSearchSort>,
    /// Sort order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<SortOrder>,
}

impl SearchCommitsParams {
    /// Creates parameters for a raw query.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            q: query.into(),
            sort: None,
            order: None,
        }
    }

    /// Commits authored by `author` between `since` and `until`, newest first.
    pub fn authored_between(author: &str, since: DateTime<Utc>, until: DateTime<Utc>) -> Self {
        let query = format!(
            "author:{} author-date:{}..{}",
            author,
            since.to_rfc3339_opts(SecondsFormat::Secs, true),
            until.to_rfc3339_opts(SecondsFormat::Secs, true)
        );
        Self::new(query)
            .sort(CommitSearchSort::AuthorDate)
            .order(SortOrder::Desc)
    }

    /// Sets the sort field.
    pub fn sort(mut self, sort: CommitSearchSort) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Sets the sort order.
    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = Some(order);
        self
    }
}

/// Commit search sort field.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommitSearchSort {
    /// Author date.
    AuthorDate,
    /// Committer date.
    CommitterDate,
}

/// Sort order.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

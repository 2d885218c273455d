//! Rate limit tracking and the aggregation time budget.
//!
//! Failed calls are never retried. The tracker only prevents requests that are
//! certain to be refused, and the budget bounds the total time one aggregation
//! may spend on the network.

use crate::errors::{GitHubError, GitHubResult, RateLimitInfo};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// Rate limit resource used by the search API.
pub const SEARCH_RESOURCE: &str = "search";

/// Rate limit resource used by every other REST endpoint.
pub const CORE_RESOURCE: &str = "core";

/// Returns the rate limit resource a request path is charged against.
pub fn resource_for_path(path: &str) -> &'static str {
    if path.trim_start_matches('/').starts_with("search/") {
        SEARCH_RESOURCE
    } else {
        CORE_RESOURCE
    }
}

/// Rate limit tracker keyed by GitHub resource category.
#[derive(Debug, Default)]
pub struct RateLimitTracker {
    buckets: RwLock<HashMap<String, RateLimitInfo>>,
}

impl RateLimitTracker {
    /// Creates a new rate limit tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates rate limit info from response headers.
    pub async fn update(&self, resource: &str, info: &RateLimitInfo) {
        let key = info.resource.clone().unwrap_or_else(|| resource.to_string());
        self.buckets.write().await.insert(key, info.clone());
    }

    /// Gets the last known info for a resource.
    pub async fn get(&self, resource: &str) -> Option<RateLimitInfo> {
        self.buckets.read().await.get(resource).cloned()
    }

    /// Gets the remaining requests for a resource, if known.
    pub async fn remaining(&self, resource: &str) -> Option<u32> {
        self.get(resource).await.map(|info| info.remaining)
    }

    /// Returns the bucket info if the resource is exhausted until a future reset.
    pub async fn exhausted(&self, resource: &str, now: DateTime<Utc>) -> Option<RateLimitInfo> {
        self.get(resource)
            .await
            .filter(|info| info.is_exhausted_at(now))
    }
}

/// Wall-clock budget shared by every call of one aggregation.
#[derive(Debug, Clone, Copy)]
pub struct Budget {
    deadline: Instant,
    limit: Duration,
}

impl Budget {
    /// Starts a budget of the given length now.
    pub fn start(limit: Duration) -> Self {
        Self {
            deadline: Instant::now() + limit,
            limit,
        }
    }

    /// Total length of the budget.
    pub fn limit(&self) -> Duration {
        self.limit
    }

    /// Time left before the deadline.
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Returns true once the deadline has passed.
    pub fn is_exhausted(&self) -> bool {
        self.remaining().is_zero()
    }

    /// Runs a call within the remaining budget.
    ///
    /// Fails fast without polling the call when nothing is left, and turns an
    /// expired deadline into a `BudgetExhausted` error.
    pub async fn run<F, T>(&self, call: F) -> GitHubResult<T>
    where
        F: Future<Output = GitHubResult<T>>,
    {
        if self.is_exhausted() {
            return Err(GitHubError::budget_exhausted(format!(
                "Aggregation budget of {:?} exhausted",
                self.limit
            )));
        }

        match tokio::time::timeout_at(self.deadline, call).await {
            Ok(result) => result,
            Err(_) => Err(GitHubError::budget_exhausted(format!(
                "Aggregation budget of {:?} exhausted",
                self.limit
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::GitHubErrorKind;

    fn info(remaining: u32, resource: Option<&str>) -> RateLimitInfo {
        RateLimitInfo {
            limit: 30,
            remaining,
            reset_at: Utc::now() + chrono::Duration::hours(1),
            retry_after: None,
            resource: resource.map(String::from),
        }
    }

    #[test]
    fn test_resource_for_path() {
        assert_eq!(resource_for_path("/search/commits"), SEARCH_RESOURCE);
        assert_eq!(resource_for_path("search/commits"), SEARCH_RESOURCE);
        assert_eq!(resource_for_path("/users/octocat/repos"), CORE_RESOURCE);
    }

    #[tokio::test]
    async fn test_rate_limit_tracker() {
        let tracker = RateLimitTracker::new();
        tracker.update(CORE_RESOURCE, &info(100, Some("core"))).await;

        assert_eq!(tracker.remaining(CORE_RESOURCE).await, Some(100));
        assert_eq!(tracker.remaining(SEARCH_RESOURCE).await, None);
        assert!(tracker.exhausted(CORE_RESOURCE, Utc::now()).await.is_none());
    }

    #[tokio::test]
    async fn test_rate_limit_buckets_are_separate() {
        let tracker = RateLimitTracker::new();
        tracker.update(SEARCH_RESOURCE, &info(0, None)).await;

        assert!(tracker.exhausted(SEARCH_RESOURCE, Utc::now()).await.is_some());
        assert!(tracker.exhausted(CORE_RESOURCE, Utc::now()).await.is_none());
    }

    #[tokio::test]
    async fn test_budget_passes_results_through() {
        let budget = Budget::start(Duration::from_secs(5));
        let value = budget.run(async { Ok::<_, GitHubError>(7) }).await.unwrap();
        assert_eq!(value, 7);
        assert!(!budget.is_exhausted());
    }

    #[tokio::test(start_paused = true)]
    async fn test_budget_expires() {
        let budget = Budget::start(Duration::from_millis(50));
        let err = budget
            .run(async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok::<_, GitHubError>(())
            })
            .await
            .unwrap_err();
        assert_eq!(*err.kind(), GitHubErrorKind::BudgetExhausted);

        assert!(budget.is_exhausted());
        let err = budget.run(async { Ok::<_, GitHubError>(()) }).await.unwrap_err();
        assert_eq!(*err.kind(), GitHubErrorKind::BudgetExhausted);
    }
}

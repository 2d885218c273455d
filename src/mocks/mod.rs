//! Canned GitHub payloads for tests.
//!
//! [`fixtures`] builds JSON bodies shaped like the endpoints the aggregator
//! reads; [`MockResponse`] pairs a body with status and headers so HTTP mocks
//! can replay GitHub's error responses.

use serde_json::{json, Value};
use std::collections::HashMap;

/// A canned HTTP response.
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// Status code.
    pub status: u16,
    /// Response body.
    pub body: Value,
    /// Headers.
    pub headers: HashMap<String, String>,
}

impl MockResponse {
    /// Creates a successful response with the given body.
    pub fn ok(body: Value) -> Self {
        Self {
            status: 200,
            body,
            headers: HashMap::new(),
        }
    }

    fn error(status: u16, message: &str) -> Self {
        Self {
            status,
            body: json!({
                "message": message,
                "documentation_url": "https://docs.github.com/rest"
            }),
            headers: HashMap::new(),
        }
    }

    /// Creates a 404 Not Found response.
    pub fn not_found() -> Self {
        Self::error(404, "Not Found")
    }

    /// Creates a 403 Forbidden response without rate limit exhaustion.
    pub fn forbidden(message: &str) -> Self {
        Self::error(403, message)
    }

    /// Creates the 409 GitHub returns when listing commits of an empty repository.
    pub fn empty_repository() -> Self {
        Self::error(409, "Git Repository is empty.")
    }

    /// Creates a 422 Validation Failed response.
    pub fn validation_failed() -> Self {
        Self::error(422, "Validation Failed")
    }

    /// Creates a 403 response with an exhausted rate limit for `resource`.
    pub fn rate_limited(resource: &str, reset_timestamp: i64) -> Self {
        Self::error(403, "API rate limit exceeded").with_rate_limit(resource, 30, 0, reset_timestamp)
    }

    /// Creates a 502 Bad Gateway response.
    pub fn bad_gateway() -> Self {
        Self::error(502, "Server Error")
    }

    /// Adds a header.
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    /// Adds rate limit headers.
    pub fn with_rate_limit(self, resource: &str, limit: u32, remaining: u32, reset_timestamp: i64) -> Self {
        self.with_header("x-ratelimit-limit", &limit.to_string())
            .with_header("x-ratelimit-remaining", &remaining.to_string())
            .with_header("x-ratelimit-reset", &reset_timestamp.to_string())
            .with_header("x-ratelimit-resource", resource)
    }
}

/// JSON bodies shaped like GitHub responses.
pub mod fixtures {
    use super::*;

    /// A commit authored at `date` (RFC 3339).
    pub fn commit(sha: &str, date: &str) -> Value {
        json!({
            "sha": sha,
            "node_id": format!("C_{}", sha),
            "commit": {
                "author": { "name": "The Octocat", "email": "octocat@github.com", "date": date },
                "committer": { "name": "GitHub", "email": "noreply@github.com", "date": date },
                "message": format!("Commit {}", sha)
            },
            "author": { "login": "octocat", "id": 1 }
        })
    }

    /// A commit search result envelope.
    pub fn search_page(items: Vec<Value>) -> Value {
        json!({
            "total_count": items.len(),
            "incomplete_results": false,
            "items": items
        })
    }

    /// A repository.
    pub fn repository(full_name: &str) -> Value {
        let name = full_name.rsplit('/').next().unwrap_or(full_name);
        json!({
            "id": 1,
            "name": name,
            "full_name": full_name,
            "private": false,
            "fork": false
        })
    }

    /// An event of `event_type` in `repo` created at `created_at` (RFC 3339).
    pub fn event(event_type: &str, payload: Value, created_at: &str, repo: &str) -> Value {
        json!({
            "id": format!("{}-{}", event_type, created_at),
            "type": event_type,
            "actor": { "id": 1, "login": "octocat" },
            "repo": { "id": 1, "name": repo },
            "payload": payload,
            "public": true,
            "created_at": created_at
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Commit, Event, Repository, SearchCommitsResult};

    #[test]
    fn test_fixtures_deserialize() {
        let commit: Commit = serde_json::from_value(fixtures::commit("abc", "2024-03-01T10:00:00Z")).unwrap();
        assert_eq!(commit.sha, "abc");

        let page: SearchCommitsResult =
            serde_json::from_value(fixtures::search_page(vec![fixtures::commit("abc", "2024-03-01T10:00:00Z")]))
                .unwrap();
        assert_eq!(page.total_count, 1);

        let repo: Repository = serde_json::from_value(fixtures::repository("octocat/hello")).unwrap();
        assert_eq!(repo.name, "hello");

        let event: Event = serde_json::from_value(fixtures::event(
            "IssuesEvent",
            json!({ "action": "opened" }),
            "2024-03-01T10:00:00Z",
            "octocat/hello",
        ))
        .unwrap();
        assert!(event.is_qualifying_contribution());
    }

    #[test]
    fn test_rate_limited_response() {
        let response = MockResponse::rate_limited("search", 1_700_000_000);
        assert_eq!(response.status, 403);
        assert_eq!(response.headers["x-ratelimit-remaining"], "0");
        assert_eq!(response.headers["x-ratelimit-resource"], "search");
    }
}

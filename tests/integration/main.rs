//! Integration tests using WireMock
//!
//! These tests run whole aggregations against a mock GitHub API and check the
//! resulting calendars, including the fallback paths and the HTTP endpoint.

mod aggregation;
mod endpoint;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use github_contributions::mocks::MockResponse;
use github_contributions::{AggregatorConfig, ContributionAggregator, GitHubClient};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const IDENTITY: &str = "octocat";

/// Fixed "now" of every scenario: the window runs 2023-03-03..=2024-03-01.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Helper to turn a canned response into a response template
pub fn template(response: MockResponse) -> ResponseTemplate {
    response
        .headers
        .iter()
        .fold(ResponseTemplate::new(response.status), |t, (k, v)| {
            t.insert_header(k.as_str(), v.as_str())
        })
        .set_body_json(response.body)
}

/// Mounts a GET route answering with the given response
pub async fn mount(server: &MockServer, route: &str, response: MockResponse) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(template(response))
        .mount(server)
        .await;
}

pub fn public_aggregator(server: &MockServer) -> ContributionAggregator {
    let client = GitHubClient::builder().base_url(server.uri()).build().unwrap();
    ContributionAggregator::new(Arc::new(client), AggregatorConfig::new(IDENTITY))
}

pub fn authenticated_aggregator(server: &MockServer, token: &str) -> ContributionAggregator {
    let client = GitHubClient::builder()
        .base_url(server.uri())
        .token(token)
        .build()
        .unwrap();
    ContributionAggregator::new(Arc::new(client), AggregatorConfig::new(IDENTITY))
}

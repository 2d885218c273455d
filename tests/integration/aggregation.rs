//! End-to-end aggregation scenarios

use super::*;
use github_contributions::config::PageCaps;
use github_contributions::mocks::fixtures;
use github_contributions::WindowBounds;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{header, query_param};

fn no_events() -> MockResponse {
    MockResponse::ok(json!([]))
}

#[tokio::test]
async fn test_search_success_counts_each_day() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/commits"))
        .and(query_param("q", "author:octocat author-date:2023-03-03T00:00:00Z..2024-03-01T23:59:59Z"))
        .and(query_param("sort", "author-date"))
        .and(query_param("order", "desc"))
        .and(query_param("per_page", "100"))
        .and(query_param("page", "1"))
        .respond_with(template(MockResponse::ok(fixtures::search_page(vec![
            fixtures::commit("a", "2024-03-01T10:00:00Z"),
            fixtures::commit("b", "2024-02-29T18:30:00Z"),
        ]))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/octocat/repos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;
    mount(&server, "/users/octocat/events/public", no_events()).await;

    let report = public_aggregator(&server).aggregate_at(now()).await;

    let days = &report.contributions;
    assert_eq!(days.len(), 365);
    assert_eq!(days[0].date, date(2023, 3, 3));
    assert_eq!(days[364].date, date(2024, 3, 1));
    assert_eq!(days[364].count, 1);
    assert_eq!(days[363].count, 1);
    assert_eq!(report.total_contributions, 2);
    assert_eq!(report.current_year_contributions, 2);
    assert!(!report.authenticated);
}

#[tokio::test]
async fn test_forbidden_search_falls_back_to_repositories() {
    let server = MockServer::start().await;
    mount(&server, "/search/commits", MockResponse::forbidden("Resource not accessible")).await;
    mount(
        &server,
        "/users/octocat/repos",
        MockResponse::ok(json!([fixtures::repository("octocat/site")])),
    )
    .await;
    mount(&server, "/users/octocat/events/public", no_events()).await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/site/commits"))
        .and(query_param("author", "octocat"))
        .and(query_param("since", "2023-03-03T00:00:00Z"))
        .and(query_param("until", "2024-03-01T23:59:59Z"))
        .respond_with(template(MockResponse::ok(json!([
            fixtures::commit("a", "2024-02-10T08:00:00Z"),
            fixtures::commit("b", "2024-02-10T12:00:00Z"),
            fixtures::commit("c", "2024-02-10T23:00:00Z"),
        ]))))
        .mount(&server)
        .await;

    let report = public_aggregator(&server).aggregate_at(now()).await;

    let day = report
        .contributions
        .iter()
        .find(|d| d.date == date(2024, 2, 10))
        .unwrap();
    assert_eq!(day.count, 3);
    assert_eq!(report.total_contributions, 3);
}

#[tokio::test]
async fn test_rate_limited_search_falls_back() {
    let server = MockServer::start().await;
    let reset = Utc::now().timestamp() + 3600;
    mount(&server, "/search/commits", MockResponse::rate_limited("search", reset)).await;
    mount(
        &server,
        "/users/octocat/repos",
        MockResponse::ok(json!([fixtures::repository("octocat/site")])),
    )
    .await;
    mount(&server, "/users/octocat/events/public", no_events()).await;
    mount(
        &server,
        "/repos/octocat/site/commits",
        MockResponse::ok(json!([fixtures::commit("a", "2024-01-15T08:00:00Z")])),
    )
    .await;

    let report = public_aggregator(&server).aggregate_at(now()).await;
    assert_eq!(report.total_contributions, 1);
}

#[tokio::test]
async fn test_invalid_query_search_falls_back() {
    let server = MockServer::start().await;
    mount(&server, "/search/commits", MockResponse::validation_failed()).await;
    mount(
        &server,
        "/users/octocat/repos",
        MockResponse::ok(json!([fixtures::repository("octocat/site")])),
    )
    .await;
    mount(&server, "/users/octocat/events/public", no_events()).await;
    mount(
        &server,
        "/repos/octocat/site/commits",
        MockResponse::ok(json!([
            fixtures::commit("a", "2024-01-15T08:00:00Z"),
            fixtures::commit("b", "2024-01-15T19:30:00Z"),
        ])),
    )
    .await;

    let report = public_aggregator(&server).aggregate_at(now()).await;
    assert_eq!(report.total_contributions, 2);
    let day = report
        .contributions
        .iter()
        .find(|d| d.date == date(2024, 1, 15))
        .unwrap();
    assert_eq!(day.count, 2);
}

#[tokio::test]
async fn test_empty_search_falls_back() {
    let server = MockServer::start().await;
    mount(&server, "/search/commits", MockResponse::ok(fixtures::search_page(vec![]))).await;
    mount(
        &server,
        "/users/octocat/repos",
        MockResponse::ok(json!([fixtures::repository("octocat/site")])),
    )
    .await;
    mount(&server, "/users/octocat/events/public", no_events()).await;
    mount(
        &server,
        "/repos/octocat/site/commits",
        MockResponse::ok(json!([
            fixtures::commit("a", "2024-01-15T08:00:00Z"),
            fixtures::commit("b", "2022-01-15T08:00:00Z"),
        ])),
    )
    .await;

    let report = public_aggregator(&server).aggregate_at(now()).await;
    assert_eq!(report.total_contributions, 1);
}

#[tokio::test]
async fn test_partial_search_is_kept_after_transient_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/commits"))
        .and(query_param("page", "1"))
        .respond_with(template(MockResponse::ok(fixtures::search_page(vec![fixtures::commit(
            "a",
            "2024-02-01T10:00:00Z",
        )]))))
        .with_priority(1)
        .mount(&server)
        .await;
    mount(&server, "/search/commits", MockResponse::bad_gateway()).await;
    Mock::given(method("GET"))
        .and(path("/users/octocat/repos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;
    mount(&server, "/users/octocat/events/public", no_events()).await;

    let client = GitHubClient::builder().base_url(server.uri()).build().unwrap();
    let aggregator = ContributionAggregator::new(
        Arc::new(client),
        AggregatorConfig::new(IDENTITY).with_per_page(1),
    );
    let report = aggregator.aggregate_at(now()).await;

    assert_eq!(report.total_contributions, 1);
}

#[tokio::test]
async fn test_event_and_commit_on_same_day_add_up() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/search/commits",
        MockResponse::ok(fixtures::search_page(vec![fixtures::commit("a", "2024-02-20T09:00:00Z")])),
    )
    .await;
    mount(
        &server,
        "/users/octocat/events/public",
        MockResponse::ok(json!([
            fixtures::event("PullRequestEvent", json!({"action": "opened"}), "2024-02-20T15:00:00Z", "octocat/site"),
            fixtures::event("PushEvent", json!({"size": 1}), "2024-02-20T09:00:00Z", "octocat/site"),
        ])),
    )
    .await;

    let report = public_aggregator(&server).aggregate_at(now()).await;

    let day = report
        .contributions
        .iter()
        .find(|d| d.date == date(2024, 2, 20))
        .unwrap();
    assert_eq!(day.count, 2);
    assert_eq!(report.total_contributions, 2);
}

#[tokio::test]
async fn test_everything_failing_yields_zero_window() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(template(MockResponse::bad_gateway()))
        .mount(&server)
        .await;

    let report = public_aggregator(&server).aggregate_at(now()).await;

    let bounds = WindowBounds::ending_at(now());
    assert_eq!(report.contributions.len(), 365);
    assert_eq!(report.contributions[0].date, bounds.start);
    assert!(report.contributions.iter().all(|d| d.count == 0));
    assert_eq!(report.total_contributions, 0);
    assert_eq!(report.current_year_contributions, 0);
}

#[tokio::test]
async fn test_inaccessible_repositories_are_skipped() {
    let server = MockServer::start().await;
    mount(&server, "/search/commits", MockResponse::validation_failed()).await;
    mount(
        &server,
        "/users/octocat/repos",
        MockResponse::ok(json!([
            fixtures::repository("octocat/gone"),
            fixtures::repository("octocat/empty"),
            fixtures::repository("octocat/broken"),
            fixtures::repository("octocat/site"),
        ])),
    )
    .await;
    mount(&server, "/users/octocat/events/public", no_events()).await;
    mount(&server, "/repos/octocat/gone/commits", MockResponse::not_found()).await;
    mount(&server, "/repos/octocat/empty/commits", MockResponse::empty_repository()).await;
    mount(&server, "/repos/octocat/broken/commits", MockResponse::bad_gateway()).await;
    mount(
        &server,
        "/repos/octocat/site/commits",
        MockResponse::ok(json!([
            fixtures::commit("a", "2024-02-01T08:00:00Z"),
            fixtures::commit("b", "2024-02-02T08:00:00Z"),
        ])),
    )
    .await;

    let report = public_aggregator(&server).aggregate_at(now()).await;
    assert_eq!(report.total_contributions, 2);
}

#[tokio::test]
async fn test_repository_named_twice_is_scanned_once() {
    let server = MockServer::start().await;
    mount(&server, "/search/commits", MockResponse::forbidden("Forbidden")).await;
    mount(
        &server,
        "/users/octocat/repos",
        MockResponse::ok(json!([fixtures::repository("octocat/site")])),
    )
    .await;
    mount(
        &server,
        "/users/octocat/events/public",
        MockResponse::ok(json!([
            fixtures::event("PushEvent", json!({}), "2024-02-01T08:00:00Z", "octocat/site"),
            fixtures::event("PushEvent", json!({}), "2024-01-01T08:00:00Z", "octocat/site"),
        ])),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/site/commits"))
        .respond_with(template(MockResponse::ok(json!([fixtures::commit(
            "a",
            "2024-02-01T08:00:00Z"
        )]))))
        .expect(1)
        .mount(&server)
        .await;

    let report = public_aggregator(&server).aggregate_at(now()).await;
    assert_eq!(report.total_contributions, 1);
}

#[tokio::test]
async fn test_current_year_subtotal() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/search/commits",
        MockResponse::ok(fixtures::search_page(vec![
            fixtures::commit("a", "2024-01-01T00:00:00Z"),
            fixtures::commit("b", "2023-12-31T23:59:59Z"),
            fixtures::commit("c", "2023-06-01T12:00:00Z"),
        ])),
    )
    .await;
    mount(&server, "/users/octocat/events/public", no_events()).await;

    let report = public_aggregator(&server).aggregate_at(now()).await;

    assert_eq!(report.total_contributions, 3);
    assert_eq!(report.current_year_contributions, 1);
}

#[tokio::test]
async fn test_credential_widens_listings() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/commits"))
        .and(header("authorization", "Bearer ghp_test"))
        .respond_with(template(MockResponse::validation_failed()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/user/repos"))
        .and(query_param("type", "all"))
        .and(query_param("sort", "updated"))
        .and(header("authorization", "Bearer ghp_test"))
        .respond_with(template(MockResponse::ok(json!([fixtures::repository("octocat/private")]))))
        .expect(1)
        .mount(&server)
        .await;
    mount(
        &server,
        "/users/octocat/events",
        MockResponse::ok(json!([fixtures::event(
            "CreateEvent",
            json!({"ref_type": "repository"}),
            "2024-02-05T08:00:00Z",
            "octocat/private"
        )])),
    )
    .await;
    mount(
        &server,
        "/repos/octocat/private/commits",
        MockResponse::ok(json!([fixtures::commit("a", "2024-02-05T09:00:00Z")])),
    )
    .await;

    let report = authenticated_aggregator(&server, "ghp_test").aggregate_at(now()).await;

    assert!(report.authenticated);
    assert_eq!(report.total_contributions, 2);
    assert!(server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .all(|r| r.url.path() != "/users/octocat/repos" && r.url.path() != "/users/octocat/events/public"));
}

#[tokio::test]
async fn test_repository_concurrency_gives_same_totals() {
    let server = MockServer::start().await;
    mount(&server, "/search/commits", MockResponse::forbidden("Forbidden")).await;
    mount(
        &server,
        "/users/octocat/repos",
        MockResponse::ok(json!([
            fixtures::repository("octocat/a"),
            fixtures::repository("octocat/b"),
            fixtures::repository("octocat/c"),
        ])),
    )
    .await;
    mount(&server, "/users/octocat/events/public", no_events()).await;
    for name in ["a", "b", "c"] {
        mount(
            &server,
            &format!("/repos/octocat/{}/commits", name),
            MockResponse::ok(json!([fixtures::commit(name, "2024-02-14T08:00:00Z")])),
        )
        .await;
    }

    let client = GitHubClient::builder().base_url(server.uri()).build().unwrap();
    let aggregator = ContributionAggregator::new(
        Arc::new(client),
        AggregatorConfig::new(IDENTITY)
            .with_repository_concurrency(3)
            .with_caps(PageCaps::default()),
    );
    let report = aggregator.aggregate_at(now()).await;

    let day = report
        .contributions
        .iter()
        .find(|d| d.date == date(2024, 2, 14))
        .unwrap();
    assert_eq!(day.count, 3);
}

//! The HTTP endpoint wired to a real aggregator

use super::*;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use github_contributions::mocks::fixtures;
use github_contributions::server::{self, AppState, CACHE_CONTROL, CONTRIBUTIONS_ROUTE};
use github_contributions::ContributionReport;
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_endpoint_serves_report() {
    let server = MockServer::start().await;
    let today = Utc::now().format("%Y-%m-%dT08:00:00Z").to_string();
    mount(
        &server,
        "/search/commits",
        MockResponse::ok(fixtures::search_page(vec![fixtures::commit("a", &today)])),
    )
    .await;
    mount(&server, "/users/octocat/events/public", MockResponse::ok(json!([]))).await;

    let router = server::router(AppState::new(Arc::new(public_aggregator(&server))));
    let response = router
        .oneshot(Request::builder().uri(CONTRIBUTIONS_ROUTE).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CACHE_CONTROL], CACHE_CONTROL);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let report: ContributionReport = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(report.contributions.len(), 365);
    assert_eq!(report.contributions[364].date, Utc::now().date_naive());
    assert_eq!(report.contributions[364].count, 1);
    assert_eq!(report.total_contributions, 1);
    assert_eq!(report.current_year_contributions, 1);
}

#[tokio::test]
async fn test_endpoint_degrades_to_zeroes_when_github_is_down() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let router = server::router(AppState::new(Arc::new(public_aggregator(&server))));
    let response = router
        .oneshot(Request::builder().uri(CONTRIBUTIONS_ROUTE).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["totalContributions"], 0);
    assert_eq!(body["contributions"].as_array().unwrap().len(), 365);
}

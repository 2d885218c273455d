//! HTTP endpoint serving the contribution report.

use crate::contributions::{ContributionAggregator, ContributionReport, FailureReport};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use futures::future::BoxFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

/// Route of the contributions endpoint.
pub const CONTRIBUTIONS_ROUTE: &str = "/api/github-contributions";

/// Cache policy of successful responses (five minutes, shared caches allowed).
pub const CACHE_CONTROL: &str = "public, max-age=300";

/// Anything that can produce a report on demand.
pub trait ReportSource: Send + Sync + 'static {
    /// Computes a fresh report.
    fn report(&self) -> BoxFuture<'_, ContributionReport>;
}

impl ReportSource for ContributionAggregator {
    fn report(&self) -> BoxFuture<'_, ContributionReport> {
        Box::pin(self.aggregate())
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    source: Arc<dyn ReportSource>,
}

impl AppState {
    /// Creates state around a report source.
    pub fn new(source: Arc<dyn ReportSource>) -> Self {
        Self { source }
    }
}

/// Builds the router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(CONTRIBUTIONS_ROUTE, get(contributions_handler))
        .with_state(state)
}

async fn contributions_handler(State(state): State<AppState>) -> Response {
    let source = state.source.clone();

    // A panic inside aggregation surfaces as a JoinError instead of tearing
    // down the connection.
    match tokio::spawn(async move { source.report().await }).await {
        Ok(report) => (
            StatusCode::OK,
            [(header::CACHE_CONTROL, CACHE_CONTROL)],
            Json(report),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Contribution aggregation aborted");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(FailureReport::default())).into_response()
        }
    }
}

/// Serves the router until Ctrl-C.
pub async fn serve(addr: SocketAddr, router: Router) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "Listening on {}", CONTRIBUTIONS_ROUTE);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for shutdown signal");
            }
            info!("HTTP server shutting down");
        })
        .await
}

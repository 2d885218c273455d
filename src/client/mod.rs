//! GitHub API client implementation.
//!
//! Read-only, no retries: a failed call is reported to the caller, which
//! decides whether to degrade or skip.

use crate::auth::AuthMethod;
use crate::config::{GitHubConfig, GitHubConfigBuilder};
use crate::errors::{GitHubError, GitHubErrorKind, GitHubResult, RateLimitInfo};
use crate::observability::{Metrics, RequestTimer, TracingHooks};
use crate::pagination::{Page, PaginationLinks, PaginationParams};
use crate::resilience::{resource_for_path, RateLimitTracker};
use crate::services::{ActivityService, RepositoriesService, SearchService};
use crate::types::{Commit, SearchCommitsResult};
use chrono::{DateTime, Utc};
use reqwest::{
    header::{HeaderMap, ACCEPT, AUTHORIZATION, USER_AGENT},
    Client, Response, StatusCode,
};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

const GITHUB_JSON: &str = "application/vnd.github+json";

/// GitHub error response format.
#[derive(Debug, serde::Deserialize)]
struct GitHubErrorResponse {
    message: String,
    documentation_url: Option<String>,
}

/// GitHub API client.
///
/// Cheap to share behind an `Arc`; the rate limit tracker and metrics live as
/// long as the client.
pub struct GitHubClient {
    /// HTTP client.
    http: Client,
    /// Configuration.
    config: GitHubConfig,
    /// Last known rate limit state per resource.
    rate_limits: Arc<RateLimitTracker>,
    /// Request metrics.
    metrics: Arc<Metrics>,
}

impl GitHubClient {
    /// Creates a new GitHub client.
    pub fn new(config: GitHubConfig) -> GitHubResult<Self> {
        config.validate()?;

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(config.pool.max_idle_per_host)
            .pool_idle_timeout(config.pool.idle_timeout)
            .build()
            .map_err(|e| {
                GitHubError::new(
                    GitHubErrorKind::InvalidConfiguration,
                    format!("Failed to create HTTP client: {}", e),
                )
            })?;

        Ok(Self {
            http,
            config,
            rate_limits: Arc::new(RateLimitTracker::new()),
            metrics: Arc::new(Metrics::new()),
        })
    }

    /// Creates a new client builder.
    pub fn builder() -> GitHubClientBuilder {
        GitHubClientBuilder::new()
    }

    /// Gets the base URL.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Returns true if requests carry a credential.
    pub fn is_authenticated(&self) -> bool {
        self.config.is_authenticated()
    }

    /// Gets the request metrics.
    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Gets the rate limit tracker.
    pub fn rate_limits(&self) -> &RateLimitTracker {
        &self.rate_limits
    }

    // Service accessors

    /// Gets the search service.
    pub fn search(&self) -> SearchService<'_> {
        SearchService::new(self)
    }

    /// Gets the repositories service.
    pub fn repositories(&self) -> RepositoriesService<'_> {
        RepositoriesService::new(self)
    }

    /// Gets the activity (events) service.
    pub fn activity(&self) -> ActivityService<'_> {
        ActivityService::new(self)
    }

    // HTTP methods

    /// Fetches one page of a JSON array endpoint.
    pub async fn get_page<T, Q>(
        &self,
        path: &str,
        query: &Q,
        pagination: &PaginationParams,
    ) -> GitHubResult<Page<T>>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let response = self.execute(path, &Self::query_string(query, pagination)?).await?;
        let links = PaginationLinks::from_headers(response.headers());
        let items: Vec<T> = Self::decode(response).await?;

        tracing::trace!(
            path = %path,
            page = pagination.page.unwrap_or(1),
            items = items.len(),
            total_pages = ?links.total_pages(),
            "Page fetched"
        );

        Ok(Self::page(items, links, pagination))
    }

    /// Fetches one page of commit search results.
    pub async fn get_search_page<Q>(
        &self,
        path: &str,
        query: &Q,
        pagination: &PaginationParams,
    ) -> GitHubResult<Page<Commit>>
    where
        Q: Serialize + ?Sized,
    {
        let response = self.execute(path, &Self::query_string(query, pagination)?).await?;
        let links = PaginationLinks::from_headers(response.headers());
        let result: SearchCommitsResult = Self::decode(response).await?;

        if result.incomplete_results {
            tracing::debug!(path = %path, "Search results marked incomplete");
        }

        Ok(Self::page(result.items, links, pagination).with_total_count(result.total_count))
    }

    // Internal methods

    fn page<T>(items: Vec<T>, links: PaginationLinks, pagination: &PaginationParams) -> Page<T> {
        Page::new(items, links)
            .with_page(pagination.page.unwrap_or(1))
            .with_per_page(pagination.per_page.unwrap_or(30))
    }

    fn query_string<Q: Serialize + ?Sized>(
        query: &Q,
        pagination: &PaginationParams,
    ) -> GitHubResult<String> {
        let parts = [
            serde_urlencoded::to_string(query),
            serde_urlencoded::to_string(pagination),
        ];

        let mut encoded = Vec::with_capacity(parts.len());
        for part in parts {
            let part = part.map_err(|e| {
                GitHubError::new(
                    GitHubErrorKind::InvalidParameter,
                    format!("Failed to serialize parameters: {}", e),
                )
            })?;
            if !part.is_empty() {
                encoded.push(part);
            }
        }

        Ok(encoded.join("&"))
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> GitHubResult<T> {
        response.json().await.map_err(|e| {
            GitHubError::deserialization(format!("Failed to deserialize response: {}", e))
                .with_cause(e)
        })
    }

    async fn execute(&self, path: &str, query: &str) -> GitHubResult<Response> {
        let url = self.build_url(path, query);
        let resource = resource_for_path(path);

        if let Some(info) = self.rate_limits.exhausted(resource, Utc::now()).await {
            TracingHooks::on_rate_limit_exceeded(&info);
            self.metrics.record_rate_limited();
            return Err(GitHubError::rate_limit(info));
        }

        TracingHooks::on_request_start("GET", &url);
        let timer = RequestTimer::new(self.metrics.clone());

        let mut request = self
            .http
            .get(&url)
            .header(USER_AGENT, &self.config.user_agent)
            .header(ACCEPT, GITHUB_JSON)
            .header("X-GitHub-Api-Version", &self.config.api_version);

        if let Some(auth) = &self.config.auth {
            request = request.header(AUTHORIZATION, auth.authorization_header());
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let error = Self::transport_error(e);
                TracingHooks::on_request_error("GET", &url, &error);
                timer.failure(&error);
                return Err(error);
            }
        };

        let status = response.status();
        let rate_limit = Self::extract_rate_limit(response.headers());
        if let Some(info) = &rate_limit {
            TracingHooks::on_rate_limit_update(info);
            self.rate_limits.update(resource, info).await;
        }

        if !status.is_success() {
            let error = Self::handle_error_response(response, rate_limit).await;
            TracingHooks::on_request_error("GET", &url, &error);
            timer.failure(&error);
            return Err(error);
        }

        TracingHooks::on_request_complete("GET", &url, status.as_u16(), timer.elapsed());
        timer.success();
        Ok(response)
    }

    fn transport_error(e: reqwest::Error) -> GitHubError {
        if e.is_timeout() {
            GitHubError::timeout(format!("Request timed out: {}", e)).with_cause(e)
        } else if e.is_connect() {
            GitHubError::new(
                GitHubErrorKind::ConnectionFailed,
                format!("Connection failed: {}", e),
            )
            .with_cause(e)
        } else {
            GitHubError::new(GitHubErrorKind::Unknown, format!("Request failed: {}", e)).with_cause(e)
        }
    }

    fn build_url(&self, path: &str, query: &str) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        if query.is_empty() {
            format!("{}/{}", base, path)
        } else {
            format!("{}/{}?{}", base, path, query)
        }
    }

    fn extract_rate_limit(headers: &HeaderMap) -> Option<RateLimitInfo> {
        let limit = headers
            .get("x-ratelimit-limit")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())?;

        let remaining = headers
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())?;

        let reset_timestamp: i64 = headers
            .get("x-ratelimit-reset")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())?;

        let reset_at = DateTime::from_timestamp(reset_timestamp, 0)?;

        let retry_after = headers
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());

        let resource = headers
            .get("x-ratelimit-resource")
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        Some(RateLimitInfo {
            limit,
            remaining,
            reset_at,
            retry_after,
            resource,
        })
    }

    async fn handle_error_response(response: Response, rate_limit: Option<RateLimitInfo>) -> GitHubError {
        let status = response.status();
        let request_id = response
            .headers()
            .get("x-github-request-id")
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        // Rate limit refusals
        if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
            if let Some(info) = &rate_limit {
                if info.remaining == 0 {
                    let mut error = GitHubError::rate_limit(info.clone()).with_status(status.as_u16());
                    if let Some(id) = request_id {
                        error = error.with_request_id(id);
                    }
                    return error;
                }
            }
        }

        let error_body = response.json::<GitHubErrorResponse>().await.ok();

        let message = error_body
            .as_ref()
            .map(|e| e.message.clone())
            .unwrap_or_else(|| format!("HTTP {} error", status.as_u16()));

        let documentation_url = error_body.and_then(|e| e.documentation_url);

        let mut error = GitHubError::from_response(
            status.as_u16(),
            message,
            documentation_url,
            request_id,
        );

        if let Some(info) = rate_limit {
            error = error.with_rate_limit(info);
        }

        error
    }
}

/// Builder for GitHubClient.
pub struct GitHubClientBuilder {
    config_builder: GitHubConfigBuilder,
}

impl GitHubClientBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            config_builder: GitHubConfig::builder(),
        }
    }

    /// Sets the base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.base_url(url);
        self
    }

    /// Sets the authentication method.
    pub fn auth(mut self, auth: AuthMethod) -> Self {
        self.config_builder = self.config_builder.auth(auth);
        self
    }

    /// Sets a bearer token.
    pub fn token(self, token: impl Into<String>) -> Self {
        self.auth(AuthMethod::token(token))
    }

    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: std::time::Duration) -> Self {
        self.config_builder = self.config_builder.timeout(timeout);
        self
    }

    /// Sets the User-Agent.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.user_agent(ua);
        self
    }

    /// Builds the client.
    pub fn build(self) -> GitHubResult<GitHubClient> {
        let config = self.config_builder.build()?;
        GitHubClient::new(config)
    }
}

impl Default for GitHubClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//! Configuration types for the client, the aggregator and the server.

use crate::auth::AuthMethod;
use crate::errors::{GitHubError, GitHubErrorKind, GitHubResult};
use crate::observability::{LogFormat, LogLevel, LoggingConfig};
use std::net::SocketAddr;
use std::time::Duration;

/// Default GitHub API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// Default GitHub API version (date-based).
pub const DEFAULT_API_VERSION: &str = "2022-11-28";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default User-Agent header.
pub const DEFAULT_USER_AGENT: &str = "github-contributions/0.1.0";

/// Largest page size GitHub accepts.
pub const MAX_PER_PAGE: u32 = 100;

/// Default overall wall-clock budget for one aggregation.
pub const DEFAULT_BUDGET: Duration = Duration::from_secs(25);

/// Default address the endpoint binds to.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Connection pool configuration.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum idle connections per host.
    pub max_idle_per_host: usize,
    /// Idle connection timeout.
    pub idle_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_idle_per_host: 8,
            idle_timeout: Duration::from_secs(90),
        }
    }
}

/// GitHub client configuration.
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    /// API base URL.
    pub base_url: String,
    /// API version header.
    pub api_version: String,
    /// Optional credential. `None` restricts every listing to public data.
    pub auth: Option<AuthMethod>,
    /// Request timeout.
    pub timeout: Duration,
    /// Connect timeout.
    pub connect_timeout: Duration,
    /// User-Agent header.
    pub user_agent: String,
    /// Connection pool configuration.
    pub pool: PoolConfig,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            auth: None,
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            pool: PoolConfig::default(),
        }
    }
}

impl GitHubConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> GitHubConfigBuilder {
        GitHubConfigBuilder::new()
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), GitHubError> {
        if self.base_url.is_empty() {
            return Err(GitHubError::new(
                GitHubErrorKind::InvalidBaseUrl,
                "Base URL cannot be empty",
            ));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(GitHubError::new(
                GitHubErrorKind::InvalidBaseUrl,
                "Base URL must start with http:// or https://",
            ));
        }

        if self.user_agent.is_empty() {
            return Err(GitHubError::configuration("User-Agent is required by GitHub API"));
        }

        Ok(())
    }

    /// Returns true if a credential is configured.
    pub fn is_authenticated(&self) -> bool {
        self.auth.is_some()
    }
}

/// Builder for GitHubConfig.
#[derive(Debug, Default)]
pub struct GitHubConfigBuilder {
    base_url: Option<String>,
    api_version: Option<String>,
    auth: Option<AuthMethod>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    user_agent: Option<String>,
    pool: Option<PoolConfig>,
}

impl GitHubConfigBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the API version.
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    /// Sets the authentication method.
    pub fn auth(mut self, auth: AuthMethod) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Sets the authentication method if one is given.
    pub fn maybe_auth(mut self, auth: Option<AuthMethod>) -> Self {
        self.auth = auth;
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets the User-Agent header.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the connection pool configuration.
    pub fn pool(mut self, config: PoolConfig) -> Self {
        self.pool = Some(config);
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> Result<GitHubConfig, GitHubError> {
        let config = GitHubConfig {
            base_url: self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_version: self.api_version.unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            auth: self.auth,
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            connect_timeout: self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT),
            user_agent: self.user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            pool: self.pool.unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }
}

/// Page caps bounding the worst-case number of calls per signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCaps {
    /// Commit search pages (10 x 100 is the search API's 1000 result ceiling).
    pub search: u32,
    /// Owned repository listing pages.
    pub repositories: u32,
    /// Event pages scanned for contributed-to repositories.
    pub contributed: u32,
    /// Commit pages per repository.
    pub commits: u32,
    /// Event pages scanned for qualifying activity.
    pub events: u32,
}

impl Default for PageCaps {
    fn default() -> Self {
        Self {
            search: 10,
            repositories: 10,
            contributed: 5,
            commits: 10,
            events: 10,
        }
    }
}

/// Configuration of one contribution aggregation.
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// GitHub login whose contributions are counted.
    pub identity: String,
    /// Page size for every listing.
    pub per_page: u32,
    /// Page caps.
    pub caps: PageCaps,
    /// Repositories scanned concurrently during enumeration (1 = sequential).
    pub repository_concurrency: usize,
    /// Overall wall-clock budget.
    pub budget: Duration,
}

impl AggregatorConfig {
    /// Creates a configuration with defaults for the given identity.
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            per_page: MAX_PER_PAGE,
            caps: PageCaps::default(),
            repository_concurrency: 1,
            budget: DEFAULT_BUDGET,
        }
    }

    /// Sets the page size (clamped to GitHub's maximum).
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.clamp(1, MAX_PER_PAGE);
        self
    }

    /// Sets the page caps.
    pub fn with_caps(mut self, caps: PageCaps) -> Self {
        self.caps = caps;
        self
    }

    /// Sets the repository concurrency.
    pub fn with_repository_concurrency(mut self, concurrency: usize) -> Self {
        self.repository_concurrency = concurrency.max(1);
        self
    }

    /// Sets the overall budget.
    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> GitHubResult<()> {
        let identity = self.identity.trim();
        if identity.is_empty() {
            return Err(GitHubError::new(
                GitHubErrorKind::MissingConfiguration,
                "GitHub identity cannot be empty",
            ));
        }
        if identity.contains('/') || identity.contains(char::is_whitespace) {
            return Err(GitHubError::configuration(format!(
                "Invalid GitHub identity: {}",
                identity
            )));
        }
        Ok(())
    }
}

/// Complete application configuration for the endpoint binary.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// GitHub client configuration.
    pub github: GitHubConfig,
    /// Aggregator configuration.
    pub aggregator: AggregatorConfig,
    /// Address to bind.
    pub bind_addr: SocketAddr,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Creates a configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `GITHUB_USERNAME` (required): identity whose contributions are counted
    /// - `GITHUB_TOKEN` (optional): credential; without it only public data is read
    /// - `GITHUB_API_BASE` (optional): custom base URL
    /// - `GITHUB_TIMEOUT_SECS` (optional): per-request timeout
    /// - `CONTRIBUTIONS_BUDGET_SECS` (optional): overall aggregation budget
    /// - `CONTRIBUTIONS_CONCURRENCY` (optional): repositories scanned at once
    /// - `CONTRIBUTIONS_BIND_ADDR` (optional): listen address
    /// - `CONTRIBUTIONS_LOG_LEVEL` (optional): default level when `RUST_LOG` is unset
    /// - `CONTRIBUTIONS_LOG_FORMAT` (optional): `pretty`, `json` or `compact`
    pub fn from_env() -> GitHubResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates a configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> GitHubResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let identity = non_empty("GITHUB_USERNAME").ok_or_else(|| {
            GitHubError::new(
                GitHubErrorKind::MissingConfiguration,
                "GITHUB_USERNAME environment variable not set",
            )
        })?;

        let mut github = GitHubConfig::builder().maybe_auth(non_empty("GITHUB_TOKEN").map(AuthMethod::token));

        if let Some(base_url) = non_empty("GITHUB_API_BASE") {
            github = github.base_url(base_url);
        }

        if let Some(secs) = parse_var::<u64>(&non_empty, "GITHUB_TIMEOUT_SECS")? {
            github = github.timeout(Duration::from_secs(secs));
        }

        let mut aggregator = AggregatorConfig::new(identity);

        if let Some(secs) = parse_var::<u64>(&non_empty, "CONTRIBUTIONS_BUDGET_SECS")? {
            aggregator = aggregator.with_budget(Duration::from_secs(secs));
        }

        if let Some(concurrency) = parse_var::<usize>(&non_empty, "CONTRIBUTIONS_CONCURRENCY")? {
            aggregator = aggregator.with_repository_concurrency(concurrency);
        }

        aggregator.validate()?;

        let bind_addr = non_empty("CONTRIBUTIONS_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| GitHubError::configuration(format!("Invalid CONTRIBUTIONS_BIND_ADDR: {}", e)))?;

        let mut logging = LoggingConfig::default();
        if let Some(level) = non_empty("CONTRIBUTIONS_LOG_LEVEL") {
            logging = logging.with_level(level.parse::<LogLevel>()?);
        }
        if let Some(format) = non_empty("CONTRIBUTIONS_LOG_FORMAT") {
            logging = logging.with_format(format.parse::<LogFormat>()?);
        }

        Ok(Self {
            github: github.build()?,
            aggregator,
            bind_addr,
            logging,
        })
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> GitHubResult<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.parse::<T>().map_err(|e| {
                GitHubError::new(
                    GitHubErrorKind::InvalidConfiguration,
                    format!("Invalid {}: {}", key, e),
                )
            })
        })
        .transpose()
}

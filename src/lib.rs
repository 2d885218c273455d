//! # GitHub Contributions
//!
//! Builds a GitHub contribution calendar for one identity over the trailing
//! 365 days (UTC) and serves it as JSON:
//! - Commit search as the primary commit signal
//! - Per-repository commit listing when search is rejected or empty
//! - Opened pull requests and issues, created repositories and published
//!   releases from the event stream
//! - Fail-open aggregation bounded by a page cap per listing and an overall
//!   time budget
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use github_contributions::{AggregatorConfig, ContributionAggregator, GitHubClient};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = GitHubClient::builder()
//!         .token("ghp_xxxxxxxxxxxx")
//!         .build()?;
//!
//!     let aggregator = ContributionAggregator::new(Arc::new(client), AggregatorConfig::new("octocat"));
//!     let report = aggregator.aggregate().await;
//!
//!     println!("{} contributions in the last year", report.total_contributions);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod config;
pub mod errors;
pub mod types;

// Authentication
pub mod auth;

// HTTP client and transport
pub mod client;

// Pagination handling
pub mod pagination;

// API Services
pub mod services;

// Aggregation
pub mod contributions;

// Inbound endpoint
pub mod server;

// Rate limits and time budget
pub mod resilience;

// Observability
pub mod observability;

// Fixtures for testing
pub mod mocks;

// Re-exports for convenience
pub use auth::AuthMethod;
pub use client::{GitHubClient, GitHubClientBuilder};
pub use config::{AggregatorConfig, AppConfig, GitHubConfig, GitHubConfigBuilder, PageCaps};
pub use contributions::{
    CommitSignal, CommitTally, ContributionAggregator, ContributionDay, ContributionReport,
    ContributionWindow, FailureReport, RepositoryId, SearchFailure, WindowBounds,
};
pub use errors::{GitHubError, GitHubErrorKind, GitHubResult};
pub use pagination::{Page, PageIterator, PaginationLinks, PaginationParams};
pub use types::*;

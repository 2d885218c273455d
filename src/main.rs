use anyhow::Context;
use github_contributions::server::{self, AppState};
use github_contributions::{AppConfig, AuthMethod, ContributionAggregator, GitHubClient};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("Failed to load configuration")?;

    config
        .logging
        .clone()
        .init()
        .map_err(|e| anyhow::anyhow!("Failed to initialise logging: {}", e))?;

    let client = GitHubClient::new(config.github.clone()).context("Failed to create GitHub client")?;
    info!(
        identity = %config.aggregator.identity,
        credential = config.github.auth.as_ref().map_or("none", AuthMethod::token_prefix),
        base_url = %client.base_url(),
        "Starting contributions endpoint"
    );

    let aggregator = ContributionAggregator::new(Arc::new(client), config.aggregator.clone());
    let router = server::router(AppState::new(Arc::new(aggregator)));

    server::serve(config.bind_addr, router)
        .await
        .with_context(|| format!("Failed to serve on {}", config.bind_addr))
}

//! Merges the commit and event signals into one contribution window.

use super::report::ContributionReport;
use super::signal::CommitSignal;
use super::tally::CommitTally;
use super::universe::{RepositoryId, RepositoryUniverse};
use super::window::{ContributionWindow, WindowBounds};
use crate::client::GitHubClient;
use crate::config::AggregatorConfig;
use crate::observability::TracingHooks;
use crate::pagination::{PageIterator, PaginationParams};
use crate::resilience::Budget;
use crate::services::{CommitListParams, EventVisibility, ListReposParams, SearchCommitsParams};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Builds contribution calendars for one GitHub identity.
///
/// Never fails: every network or API failure degrades the affected signal and
/// the window falls back toward zero.
pub struct ContributionAggregator {
    client: Arc<GitHubClient>,
    config: AggregatorConfig,
}

impl ContributionAggregator {
    /// Creates an aggregator over a shared client.
    pub fn new(client: Arc<GitHubClient>, config: AggregatorConfig) -> Self {
        Self { client, config }
    }

    /// Gets the configuration.
    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Gets the client.
    pub fn client(&self) -> &Arc<GitHubClient> {
        &self.client
    }

    /// Aggregates the window ending today (UTC).
    pub async fn aggregate(&self) -> ContributionReport {
        let mut report = self.aggregate_at(Utc::now()).await;
        report.last_updated = Utc::now();
        report
    }

    /// Aggregates the window whose last day contains `now`.
    pub async fn aggregate_at(&self, now: DateTime<Utc>) -> ContributionReport {
        let started = Instant::now();
        let metrics_before = self.client.metrics().snapshot();
        let budget = Budget::start(self.config.budget);
        let bounds = WindowBounds::ending_at(now);
        let authenticated = self.client.is_authenticated();
        let mut window = ContributionWindow::new(bounds);

        info!(
            identity = %self.config.identity,
            since = %bounds.since,
            until = %bounds.until,
            authenticated,
            "Aggregating contributions"
        );

        let tally = match self.commit_signal(&bounds, &budget).await {
            CommitSignal::SearchSucceeded(tally) => tally,
            CommitSignal::SearchFailed(failure) => {
                info!(reason = %failure, "Commit search unusable, enumerating repositories");
                self.commits_from_repositories(&bounds, &budget).await
            }
        };
        window.add_tally(&tally);

        let events = self.event_signal(&bounds, &budget, &mut window).await;
        debug!(commits = tally.total(), events, "Signals merged");

        let report = ContributionReport::from_window(window, now, authenticated);
        TracingHooks::on_aggregation_complete(
            &self.config.identity,
            report.total_contributions,
            &self.client.metrics().snapshot().since(&metrics_before),
            started.elapsed(),
        );
        report
    }

    /// Runs the commit search over the window.
    pub async fn commit_signal(&self, bounds: &WindowBounds, budget: &Budget) -> CommitSignal {
        let params = SearchCommitsParams::authored_between(&self.config.identity, bounds.since, bounds.until);
        let search = self.client.search();
        let (search, params) = (&search, &params);

        let mut pages = PageIterator::new(
            move |pagination: PaginationParams| async move {
                budget.run(search.commits_page(params, &pagination)).await
            },
            self.config.per_page,
            self.config.caps.search,
        );

        let mut tally = CommitTally::new();
        let mut failure = None;
        let mut reported_total = None;

        while let Some(page) = pages.next_page().await {
            match page {
                Ok(page) => {
                    reported_total = reported_total.or(page.total_count);
                    for commit in page {
                        if let Some(ts) = commit.authored_at() {
                            tally.record_within(bounds, ts);
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Commit search failed");
                    failure = Some(e);
                }
            }
        }

        info!(
            pages = pages.pages_fetched(),
            reported_total = reported_total.unwrap_or(0),
            tallied = tally.total(),
            "Commit search finished"
        );

        CommitSignal::from_search(tally, failure.as_ref())
    }

    /// Counts commits by listing each repository of the universe.
    pub async fn commits_from_repositories(&self, bounds: &WindowBounds, budget: &Budget) -> CommitTally {
        let repositories = self.repository_universe(budget).await;
        info!(repositories = repositories.len(), "Scanning repositories for commits");

        let tally = stream::iter(repositories)
            .map(|repository| self.repository_commits(repository, bounds, budget))
            .buffer_unordered(self.config.repository_concurrency.max(1))
            .fold(CommitTally::new(), |mut acc, tally| async move {
                acc.merge(tally);
                acc
            })
            .await;

        info!(commits = tally.total(), "Repository scan finished");
        tally
    }

    /// Owned repositories followed by those named in the event stream,
    /// without duplicates, in first-seen order.
    pub async fn repository_universe(&self, budget: &Budget) -> Vec<RepositoryId> {
        let mut universe = RepositoryUniverse::new();
        let identity = self.config.identity.as_str();
        let repos = self.client.repositories();
        let activity = self.client.activity();
        let (repos, activity) = (&repos, &activity);
        let list_params = ListReposParams::all_recently_updated();
        let list_params = &list_params;
        let authenticated = self.client.is_authenticated();

        let owned = PageIterator::new(
            move |pagination: PaginationParams| async move {
                let call = async {
                    if authenticated {
                        repos.list_for_authenticated_user_page(list_params, &pagination).await
                    } else {
                        repos.list_for_user_page(identity, list_params, &pagination).await
                    }
                };
                budget.run(call).await
            },
            self.config.per_page,
            self.config.caps.repositories,
        )
        .collect_partial()
        .await;

        if let Some(e) = &owned.error {
            warn!(error = %e, "Listing owned repositories failed");
        }
        for repository in &owned.items {
            universe.insert_name(&repository.full_name);
        }
        let owned_count = universe.len();

        let visibility = EventVisibility::for_credential(authenticated);
        let events = PageIterator::new(
            move |pagination: PaginationParams| async move {
                budget
                    .run(activity.list_events_page(identity, visibility, &pagination))
                    .await
            },
            self.config.per_page,
            self.config.caps.contributed,
        )
        .collect_partial()
        .await;

        if let Some(e) = &events.error {
            warn!(error = %e, "Listing events for contributed repositories failed");
        }
        for event in &events.items {
            universe.insert_name(&event.repo.name);
        }

        debug!(
            owned = owned_count,
            contributed = universe.len() - owned_count,
            "Repository universe built"
        );
        universe.into_vec()
    }

    async fn repository_commits(&self, repository: RepositoryId, bounds: &WindowBounds, budget: &Budget) -> CommitTally {
        let mut tally = CommitTally::new();
        if budget.is_exhausted() {
            debug!(repository = %repository, "Budget exhausted, repository skipped");
            return tally;
        }

        let repos = self.client.repositories();
        let params = CommitListParams::authored_between(&self.config.identity, bounds.since, bounds.until);
        let (repos, params) = (&repos, &params);
        let full_name = repository.as_str();

        let mut pages = PageIterator::new(
            move |pagination: PaginationParams| async move {
                budget
                    .run(repos.list_commits_page(full_name, params, &pagination))
                    .await
            },
            self.config.per_page,
            self.config.caps.commits,
        );

        while let Some(page) = pages.next_page().await {
            match page {
                Ok(page) => {
                    for commit in page {
                        if let Some(ts) = commit.authored_at() {
                            tally.record_within(bounds, ts);
                        }
                    }
                }
                Err(e) if e.is_inaccessible() => {
                    debug!(repository = %repository, error = %e, "Repository skipped");
                }
                Err(e) => {
                    warn!(repository = %repository, error = %e, "Listing commits failed");
                }
            }
        }

        tally
    }

    /// Adds qualifying events inside the window, newest first, stopping at
    /// the first event older than the window. Returns the number added.
    pub async fn event_signal(&self, bounds: &WindowBounds, budget: &Budget, window: &mut ContributionWindow) -> u64 {
        let identity = self.config.identity.as_str();
        let activity = self.client.activity();
        let activity = &activity;
        let visibility = EventVisibility::for_credential(self.client.is_authenticated());

        let mut pages = PageIterator::new(
            move |pagination: PaginationParams| async move {
                budget
                    .run(activity.list_events_page(identity, visibility, &pagination))
                    .await
            },
            self.config.per_page,
            self.config.caps.events,
        );

        let mut counted = 0;
        'pages: while let Some(page) = pages.next_page().await {
            match page {
                Ok(page) => {
                    for event in page {
                        if event.created_at < bounds.since {
                            break 'pages;
                        }
                        if bounds.contains(event.created_at)
                            && event.is_qualifying_contribution()
                            && window.add(event.created_at.date_naive(), 1)
                        {
                            counted += 1;
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Listing events failed");
                }
            }
        }

        info!(pages = pages.pages_fetched(), counted, "Event scan finished");
        counted
    }
}

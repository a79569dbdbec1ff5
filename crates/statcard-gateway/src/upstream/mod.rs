//! Outbound metric fetchers.
//!
//! Every fetch degrades at this boundary: callers get a number (or a
//! zero-filled [`ContributionTotals`]) and never an error. Failures are logged
//! and counted.

pub mod client;
mod contributions;
mod rest;
pub mod retry;
mod stars;

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;

use statcard_core::error::Result;
use statcard_core::{ContributionTotals, ContributionWindow};

use crate::config::{GatewayConfig, StarSource};
use crate::obs::CardMetrics;

pub use client::UpstreamClient;
pub use retry::{retry, RetryPolicy};

use contributions::{query_contributions, Visibility};

const GRAPHQL_SOURCE: &str = "graphql_contributions";

/// Source of raw card metrics.
#[async_trait]
pub trait StatsFetcher: Send + Sync {
    /// Whether a provider credential is configured.
    fn has_credential(&self) -> bool;
    /// Star total for one account. 0 when unavailable.
    async fn stars(&self, account: &str) -> u64;
    /// Contribution counters for one account. Zero-filled when unavailable.
    async fn contributions(&self, login: &str) -> ContributionTotals;
}

/// Fetcher backed by the public star service and the GitHub APIs.
pub struct GitHubFetcher {
    client: UpstreamClient,
    stars_url: String,
    api_url: String,
    graphql_url: String,
    star_source: StarSource,
    window: ContributionWindow,
    policy: RetryPolicy,
    rest_max_pages: u32,
    metrics: Arc<CardMetrics>,
}

impl GitHubFetcher {
    pub fn new(cfg: &GatewayConfig, token: Option<String>, metrics: Arc<CardMetrics>) -> Result<Self> {
        Ok(Self {
            client: UpstreamClient::new(&cfg.upstream, token)?,
            stars_url: cfg.upstream.stars_url.clone(),
            api_url: cfg.upstream.api_url.clone(),
            graphql_url: cfg.upstream.graphql_url.clone(),
            star_source: cfg.card.star_source,
            window: cfg.card.contribution_window,
            policy: RetryPolicy::from(&cfg.retry).with_attempt_timeout(cfg.upstream.request_timeout()),
            rest_max_pages: cfg.retry.rest_max_pages,
            metrics,
        })
    }

    fn record(&self, source: &str, outcome: &str, started: Instant) {
        self.metrics
            .upstream_fetches
            .inc(&[("source", source), ("outcome", outcome)]);
        self.metrics
            .upstream_duration
            .observe(&[("source", source)], started.elapsed());
    }
}

#[async_trait]
impl StatsFetcher for GitHubFetcher {
    fn has_credential(&self) -> bool {
        self.client.has_token()
    }

    async fn stars(&self, account: &str) -> u64 {
        let started = Instant::now();
        let source = self.star_source.as_str();

        let result = match self.star_source {
            StarSource::Service => {
                stars::fetch_service_stars(&self.client, &self.stars_url, account, &self.policy).await
            }
            other => {
                rest::fetch_rest_stars(
                    &self.client,
                    &self.api_url,
                    account,
                    other,
                    &self.policy,
                    self.rest_max_pages,
                )
                .await
            }
        };

        match result {
            Ok(stars) => {
                self.record(source, "ok", started);
                stars
            }
            Err(e) => {
                tracing::warn!(
                    %account,
                    source,
                    code = e.client_code().as_str(),
                    error = %e,
                    "star fetch exhausted retries, using 0"
                );
                self.record(source, "degraded", started);
                0
            }
        }
    }

    async fn contributions(&self, login: &str) -> ContributionTotals {
        let started = Instant::now();

        if !self.client.has_token() {
            tracing::warn!(%login, "no provider credential configured, contribution counters zero-filled");
            self.record(GRAPHQL_SOURCE, "no_credential", started);
            return ContributionTotals::default();
        }

        let range = self.window.range(Utc::now());
        let private = query_contributions(
            &self.client,
            &self.graphql_url,
            login,
            range,
            Visibility::PrivateInclusive,
        )
        .await;

        let e = match private {
            Ok(totals) => {
                self.record(GRAPHQL_SOURCE, "ok", started);
                return totals;
            }
            Err(e) => e,
        };

        tracing::warn!(
            %login,
            variant = Visibility::PrivateInclusive.as_str(),
            code = e.client_code().as_str(),
            error = %e,
            "contributions query failed, falling back to public"
        );

        match query_contributions(&self.client, &self.graphql_url, login, range, Visibility::PublicOnly).await {
            Ok(totals) => {
                self.record(GRAPHQL_SOURCE, "fallback", started);
                totals
            }
            Err(e) => {
                tracing::warn!(
                    %login,
                    variant = Visibility::PublicOnly.as_str(),
                    code = e.client_code().as_str(),
                    error = %e,
                    "contributions query failed, zero-filling"
                );
                self.record(GRAPHQL_SOURCE, "degraded", started);
                ContributionTotals::default()
            }
        }
    }
}

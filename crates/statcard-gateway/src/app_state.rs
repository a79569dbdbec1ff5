//! Shared application state for the card gateway.
//!
//! Collaborators (fetcher, star store) are injected so tests can swap them;
//! [`AppState::new`] wires the production ones from config and environment.

use std::collections::HashMap;
use std::sync::Arc;

use statcard_core::error::Result;
use statcard_core::normalize_key;

use crate::aggregate::StatsAggregator;
use crate::config::GatewayConfig;
use crate::infra::{parse_seed_vars, HighestStarsStore, InMemoryStarsStore};
use crate::obs::CardMetrics;
use crate::upstream::{GitHubFetcher, StatsFetcher};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    aggregator: Arc<StatsAggregator>,
    metrics: Arc<CardMetrics>,
}

struct AppStateInner {
    cfg: GatewayConfig,
}

impl AppState {
    /// Build production state: credential and cache seeds come from the
    /// process environment.
    pub fn new(cfg: GatewayConfig) -> Result<Self> {
        let metrics = Arc::new(CardMetrics::default());

        let token = cfg.upstream.token_from_env();
        if token.is_none() {
            tracing::warn!(
                env = %cfg.upstream.token_env,
                "provider credential not set, contribution counters will be zero"
            );
        }
        let fetcher = GitHubFetcher::new(&cfg, token, Arc::clone(&metrics))?;

        // Env entries override config entries for the same key.
        let mut seed: HashMap<String, u64> = cfg
            .cache
            .seed
            .iter()
            .map(|(key, stars)| (normalize_key(key), *stars))
            .collect();
        seed.extend(parse_seed_vars(&cfg.cache.seed_env_prefix, std::env::vars()));
        let store = InMemoryStarsStore::with_seed(seed);
        tracing::info!(entries = store.len(), "star store seeded");

        Ok(Self::from_parts(cfg, Arc::new(fetcher), Arc::new(store), metrics))
    }

    pub fn from_parts(
        cfg: GatewayConfig,
        fetcher: Arc<dyn StatsFetcher>,
        store: Arc<dyn HighestStarsStore>,
        metrics: Arc<CardMetrics>,
    ) -> Self {
        let aggregator = StatsAggregator::new(fetcher, store, Arc::clone(&metrics));
        Self {
            inner: Arc::new(AppStateInner { cfg }),
            aggregator: Arc::new(aggregator),
            metrics,
        }
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn aggregator(&self) -> Arc<StatsAggregator> {
        Arc::clone(&self.aggregator)
    }

    pub fn metrics(&self) -> Arc<CardMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn has_credential(&self) -> bool {
        self.aggregator.fetcher().has_credential()
    }

    pub fn set_draining(&self) {
        self.metrics.set_draining();
    }

    pub fn is_draining(&self) -> bool {
        self.metrics.is_draining()
    }

    /// Extra gauge lines for `/metrics`.
    pub fn metrics_extra(&self) -> Vec<(&'static str, u64)> {
        vec![("statcard_credential_present", u64::from(self.has_credential()))]
    }
}

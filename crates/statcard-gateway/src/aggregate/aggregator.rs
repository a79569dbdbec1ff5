use std::sync::Arc;

use futures_util::future::join3;

use statcard_core::{composite_key, reconcile, MetricsSnapshot, Reconciled};

use crate::infra::{HighestStarsStore, KeyedLocks};
use crate::obs::CardMetrics;
use crate::upstream::StatsFetcher;

/// Result of one aggregation: what to draw and how it was decided.
#[derive(Debug, Clone, Copy)]
pub struct CardOutcome {
    pub snapshot: MetricsSnapshot,
    /// `user stars + org stars` as fetched, before reconciliation.
    pub calculated_stars: u64,
    pub reconciled: Reconciled,
}

pub struct StatsAggregator {
    fetcher: Arc<dyn StatsFetcher>,
    store: Arc<dyn HighestStarsStore>,
    locks: KeyedLocks,
    metrics: Arc<CardMetrics>,
}

impl StatsAggregator {
    pub fn new(
        fetcher: Arc<dyn StatsFetcher>,
        store: Arc<dyn HighestStarsStore>,
        metrics: Arc<CardMetrics>,
    ) -> Self {
        Self {
            fetcher,
            store,
            locks: KeyedLocks::new(),
            metrics,
        }
    }

    pub fn fetcher(&self) -> &Arc<dyn StatsFetcher> {
        &self.fetcher
    }

    /// Build the snapshot for `(user, org)`.
    ///
    /// The three fetches run concurrently and all settle before the store is
    /// touched. The store read-modify-write is serialized per composite key.
    pub async fn aggregate(&self, user: &str, org: &str) -> CardOutcome {
        let org_stars = async {
            // Same account twice would double count.
            if org.eq_ignore_ascii_case(user) {
                0
            } else {
                self.fetcher.stars(org).await
            }
        };
        let (user_stars, org_stars, contributions) = join3(
            self.fetcher.stars(user),
            org_stars,
            self.fetcher.contributions(user),
        )
        .await;

        let calculated = user_stars.saturating_add(org_stars);
        let key = composite_key(user, org);
        let reconciled = self.reconcile_key(&key, calculated).await;

        self.metrics
            .reconcile_decisions
            .inc(&[("decision", reconciled.decision.as_str())]);
        tracing::info!(
            %user,
            %org,
            user_stars,
            org_stars,
            calculated,
            displayed = reconciled.displayed,
            decision = reconciled.decision.as_str(),
            "stars reconciled"
        );

        CardOutcome {
            snapshot: MetricsSnapshot::new(reconciled.displayed, contributions),
            calculated_stars: calculated,
            reconciled,
        }
    }

    async fn reconcile_key(&self, key: &str, calculated: u64) -> Reconciled {
        let _guard = self.locks.lock(key).await;

        let stored = match self.store.get(key).await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(%key, error = %e, "star store read failed, treating as empty");
                self.metrics.store_errors.inc(&[("op", "get")]);
                None
            }
        };

        let reconciled = reconcile(calculated, stored);
        if let Some(v) = reconciled.cache_update {
            if let Err(e) = self.store.set(key, v).await {
                tracing::warn!(%key, value = v, error = %e, "star store write failed");
                self.metrics.store_errors.inc(&[("op", "set")]);
            }
        }
        reconciled
    }
}

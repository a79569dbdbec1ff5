//! Fetch, reconcile, snapshot.

pub mod aggregator;

pub use aggregator::{CardOutcome, StatsAggregator};

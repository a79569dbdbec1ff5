//! Card data model.

use serde::Serialize;

/// Contribution counters for one account over one window.
///
/// `Default` is the zero-filled degraded result returned whenever the
/// provider cannot be queried.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ContributionTotals {
    pub commits: u64,
    pub prs: u64,
    pub issues: u64,
    pub contributed_to: u64,
}

impl ContributionTotals {
    pub fn is_zeroed(&self) -> bool {
        *self == Self::default()
    }
}

/// Everything the renderer needs. Built once per request and never mutated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub total_stars: u64,
    pub total_commits: u64,
    pub total_prs: u64,
    pub total_issues: u64,
    pub total_contributed_to: u64,
}

impl MetricsSnapshot {
    pub fn new(total_stars: u64, contributions: ContributionTotals) -> Self {
        Self {
            total_stars,
            total_commits: contributions.commits,
            total_prs: contributions.prs,
            total_issues: contributions.issues,
            total_contributed_to: contributions.contributed_to,
        }
    }
}

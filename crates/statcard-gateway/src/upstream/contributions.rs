//! Contribution counters from the provider's GraphQL API.
//!
//! Both variants share one document; `includePrivate` toggles the restricted
//! (private) contribution count, which needs extra token scope. The private
//! variant is tried first and the public one is the fallback.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::json;

use statcard_core::error::{Result, StatCardError};
use statcard_core::ContributionTotals;

use super::client::{check_status, UpstreamClient};

const CONTRIBUTIONS_QUERY: &str = r#"
query ($login: String!, $from: DateTime!, $to: DateTime!, $includePrivate: Boolean!) {
  user(login: $login) {
    contributionsCollection(from: $from, to: $to) {
      totalCommitContributions
      totalPullRequestContributions
      totalIssueContributions
      restrictedContributionsCount @include(if: $includePrivate)
    }
    repositoriesContributedTo(first: 1, contributionTypes: [COMMIT, ISSUE, PULL_REQUEST, REPOSITORY]) {
      totalCount
    }
  }
}
"#;

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ContributionsData {
    user: Option<UserNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserNode {
    contributions_collection: CollectionNode,
    repositories_contributed_to: CountNode,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CollectionNode {
    total_commit_contributions: u64,
    total_pull_request_contributions: u64,
    total_issue_contributions: u64,
    #[serde(default)]
    restricted_contributions_count: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CountNode {
    total_count: u64,
}

/// Which query variant produced the totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Visibility {
    PrivateInclusive,
    PublicOnly,
}

impl Visibility {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Visibility::PrivateInclusive => "private",
            Visibility::PublicOnly => "public",
        }
    }
}

pub(crate) async fn query_contributions(
    client: &UpstreamClient,
    graphql_url: &str,
    login: &str,
    (from, to): (DateTime<Utc>, DateTime<Utc>),
    visibility: Visibility,
) -> Result<ContributionTotals> {
    let include_private = visibility == Visibility::PrivateInclusive;
    let body = json!({
        "query": CONTRIBUTIONS_QUERY,
        "variables": {
            "login": login,
            "from": from.to_rfc3339_opts(SecondsFormat::Secs, true),
            "to": to.to_rfc3339_opts(SecondsFormat::Secs, true),
            "includePrivate": include_private,
        }
    });

    let resp = check_status(
        client.post_provider(graphql_url, &body).await?,
        "contributions query",
    )?;
    let parsed: GraphQlResponse<ContributionsData> = resp
        .json()
        .await
        .map_err(|e| StatCardError::Upstream(format!("contributions payload: {e}")))?;

    if let Some(first) = parsed.errors.first() {
        return Err(StatCardError::Upstream(format!(
            "contributions query error ({} total): {}",
            parsed.errors.len(),
            first.message
        )));
    }

    let user = parsed
        .data
        .and_then(|d| d.user)
        .ok_or_else(|| StatCardError::NotFound(format!("user {login}")))?;

    let c = user.contributions_collection;
    let commits = if include_private {
        c.total_commit_contributions + c.restricted_contributions_count
    } else {
        c.total_commit_contributions
    };

    Ok(ContributionTotals {
        commits,
        prs: c.total_pull_request_contributions,
        issues: c.total_issue_contributions,
        contributed_to: user.repositories_contributed_to.total_count,
    })
}

//! REST star sources with `Link: rel="next"` pagination.

use reqwest::header::LINK;
use serde::Deserialize;

use statcard_core::error::{Result, StatCardError};

use super::client::{check_status, UpstreamClient};
use super::retry::{retry, RetryPolicy};
use crate::config::StarSource;

const PAGE_SIZE: u32 = 100;

#[derive(Debug, Deserialize)]
struct RepoEntry {
    #[serde(default)]
    stargazers_count: u64,
}

/// Count stars over the account's owned or starred repositories.
///
/// Stops at `max_pages`. A failure after the first page keeps what was
/// already counted.
pub(crate) async fn fetch_rest_stars(
    client: &UpstreamClient,
    api_url: &str,
    account: &str,
    source: StarSource,
    policy: &RetryPolicy,
    max_pages: u32,
) -> Result<u64> {
    let path = match source {
        StarSource::OwnedRepos => "repos",
        StarSource::StarredRepos => "starred",
        StarSource::Service => {
            return Err(StatCardError::Internal("star service is not a REST source".into()))
        }
    };
    let base = api_url.trim_end_matches('/');

    let mut total = 0u64;
    let mut page = 1u32;
    loop {
        let url = format!("{base}/users/{account}/{path}?per_page={PAGE_SIZE}&page={page}");
        let page_client = client.clone();

        let fetched = retry(policy, "rest_page", url, move |url: String| {
            let client = page_client.clone();
            async move {
                let resp = check_status(client.get_provider(&url).await?, "repository list")?;
                let has_next_page = resp
                    .headers()
                    .get(LINK)
                    .and_then(|h| h.to_str().ok())
                    .is_some_and(|link| link.contains(r#"rel="next""#));
                let repos: Vec<RepoEntry> = resp
                    .json()
                    .await
                    .map_err(|e| StatCardError::Upstream(format!("repository list: {e}")))?;
                Ok((repos, has_next_page))
            }
        })
        .await;

        let (repos, has_next_page) = match fetched {
            Ok(v) => v,
            Err(e) if page == 1 => return Err(e),
            Err(e) => {
                tracing::warn!(%account, page, error = %e, "repository pagination cut short");
                break;
            }
        };

        total += match source {
            StarSource::StarredRepos => repos.len() as u64,
            _ => repos.iter().map(|r| r.stargazers_count).sum(),
        };

        if repos.is_empty() || !has_next_page {
            break;
        }
        if page >= max_pages {
            tracing::debug!(%account, max_pages, total, "reached repository page limit");
            break;
        }
        page += 1;
    }

    Ok(total)
}

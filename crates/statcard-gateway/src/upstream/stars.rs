//! Public star-count service.
//!
//! `GET {stars_url}/{account}` answers `{ "stars": <number> }`. The service is
//! flaky: besides network errors it sometimes returns garbage or a bare zero,
//! so all three are retried.

use serde_json::Value;

use statcard_core::error::{Result, StatCardError};

use super::client::{check_status, UpstreamClient};
use super::retry::{retry, RetryPolicy};

pub(crate) async fn fetch_service_stars(
    client: &UpstreamClient,
    stars_url: &str,
    account: &str,
    policy: &RetryPolicy,
) -> Result<u64> {
    let url = format!("{}/{}", stars_url.trim_end_matches('/'), account);
    let client = client.clone();
    let account = account.to_owned();

    retry(policy, "star_service", url, move |url: String| {
        let client = client.clone();
        let account = account.clone();
        async move {
            let resp = check_status(client.get_public(&url).await?, "star service")?;
            let body: Value = resp
                .json()
                .await
                .map_err(|e| StatCardError::Upstream(format!("star payload is not json: {e}")))?;

            let stars = parse_stars(&body).ok_or_else(|| {
                StatCardError::Upstream("star payload has no numeric `stars`".into())
            })?;
            if stars == 0 {
                // Indistinguishable from a failed count upstream; ask again.
                return Err(StatCardError::Upstream("star service returned 0".into()));
            }

            tracing::debug!(%account, stars, "star service answered");
            Ok(stars)
        }
    })
    .await
}

/// Read `stars` as a non-negative integer. Fractional values are truncated.
fn parse_stars(body: &Value) -> Option<u64> {
    let v = body.get("stars")?;
    if let Some(n) = v.as_u64() {
        return Some(n);
    }
    v.as_f64()
        .filter(|f| f.is_finite() && *f >= 0.0)
        .map(|f| f as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_numeric_stars() {
        assert_eq!(parse_stars(&json!({ "stars": 27 })), Some(27));
        assert_eq!(parse_stars(&json!({ "stars": 27.9 })), Some(27));
        assert_eq!(parse_stars(&json!({ "stars": 0 })), Some(0));
    }

    #[test]
    fn rejects_missing_or_non_numeric() {
        assert_eq!(parse_stars(&json!({})), None);
        assert_eq!(parse_stars(&json!({ "stars": "27" })), None);
        assert_eq!(parse_stars(&json!({ "stars": -3 })), None);
        assert_eq!(parse_stars(&json!([1, 2])), None);
    }
}

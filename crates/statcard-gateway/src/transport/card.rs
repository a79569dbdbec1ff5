//! Stats card endpoint.
//!
//! Always answers 200: upstream trouble shows up as zero or held values on
//! the card, never as an error page. `debug=true` swaps the card for a JSON
//! status payload.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::json;

use statcard_core::{is_valid_login, render_card, CardText};

use crate::app_state::AppState;

pub const SVG_CONTENT_TYPE: &str = "image/svg+xml; charset=utf-8";
pub const CACHE_CONTROL_FRESH: &str =
    "public, max-age=1800, s-maxage=1800, stale-while-revalidate=86400";
pub const CACHE_CONTROL_NO_STORE: &str = "no-store, max-age=0";

#[derive(Debug, Default, Deserialize)]
pub struct CardQuery {
    pub username: Option<String>,
    pub org: Option<String>,
    pub debug: Option<String>,
}

impl CardQuery {
    fn is_debug(&self) -> bool {
        matches!(self.debug.as_deref(), Some("true" | "1"))
    }
}

/// Use `raw` when it is a plausible login, the configured default otherwise.
fn resolve_login(raw: Option<&str>, default: &str, field: &'static str) -> String {
    match raw.map(str::trim) {
        None | Some("") => default.to_string(),
        Some(s) if is_valid_login(s) => s.to_string(),
        Some(s) => {
            tracing::warn!(field, value = %s, fallback = %default, "invalid login in query, using default");
            default.to_string()
        }
    }
}

pub async fn card(State(app): State<AppState>, Query(q): Query<CardQuery>) -> Response {
    let card_cfg = &app.cfg().card;
    let user = resolve_login(q.username.as_deref(), &card_cfg.default_user, "username");
    let org = resolve_login(q.org.as_deref(), &card_cfg.default_org, "org");

    if q.is_debug() {
        app.metrics().debug_requests.inc(&[]);
        return Json(json!({
            "status": "ok",
            "has_token": app.has_credential(),
            "query": {
                "username": q.username,
                "org": q.org,
                "debug": q.debug,
            },
            "resolved": {
                "username": user,
                "org": org,
            },
            "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }))
        .into_response();
    }

    let metrics = app.metrics();
    let in_flight = metrics.cards_in_flight.track();
    let outcome = app.aggregator().aggregate(&user, &org).await;
    drop(in_flight);

    let text = CardText {
        title: card_cfg.title.clone(),
        window_label: card_cfg.contribution_window.label(Utc::now()),
    };
    let svg = render_card(&outcome.snapshot, &text);

    let cacheable = outcome.reconciled.is_cacheable();
    metrics
        .card_requests
        .inc(&[("cacheable", if cacheable { "true" } else { "false" })]);
    let cache_control = if cacheable {
        CACHE_CONTROL_FRESH
    } else {
        CACHE_CONTROL_NO_STORE
    };

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, SVG_CONTENT_TYPE),
            (header::CACHE_CONTROL, cache_control),
        ],
        svg,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_logins() {
        assert_eq!(resolve_login(None, "octocat", "username"), "octocat");
        assert_eq!(resolve_login(Some(""), "octocat", "username"), "octocat");
        assert_eq!(resolve_login(Some(" alice "), "octocat", "username"), "alice");
        assert_eq!(resolve_login(Some("<svg>"), "octocat", "username"), "octocat");
    }

    #[test]
    fn debug_flag_values() {
        let q = |d: &str| CardQuery { debug: Some(d.into()), ..Default::default() };
        assert!(q("true").is_debug());
        assert!(q("1").is_debug());
        assert!(!q("false").is_debug());
        assert!(!CardQuery::default().is_debug());
    }
}

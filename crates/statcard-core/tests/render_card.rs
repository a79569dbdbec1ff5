//! Card renderer output checks.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use statcard_core::render::{row_offsets, CARD_HEIGHT};
use statcard_core::{render_card, CardText, MetricsSnapshot};

fn snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        total_stars: 1_234,
        total_commits: 567,
        total_prs: 89,
        total_issues: 12,
        total_contributed_to: 3,
    }
}

fn text(window: &str) -> CardText {
    CardText {
        title: "GitHub Stats".into(),
        window_label: window.into(),
    }
}

#[test]
fn identical_input_is_byte_identical() {
    let a = render_card(&snapshot(), &text("last 365 days"));
    let b = render_card(&snapshot(), &text("last 365 days"));
    assert_eq!(a, b);
}

#[test]
fn only_window_label_varies() {
    let a = render_card(&snapshot(), &text("2025"));
    let b = render_card(&snapshot(), &text("2026"));
    assert_ne!(a, b);
    assert_eq!(a.replace("2025", "2026"), b);
}

#[test]
fn contains_every_row() {
    let svg = render_card(&snapshot(), &text("last 365 days"));
    assert!(svg.starts_with("<svg "));
    assert!(svg.ends_with("</svg>"));
    assert!(svg.contains(">Total Stars Earned:<"));
    assert!(svg.contains(">1,234<"));
    assert!(svg.contains(">Total Commits (last 365 days):<"));
    assert!(svg.contains(">567<"));
    assert!(svg.contains(">Total PRs:<"));
    assert!(svg.contains(">89<"));
    assert!(svg.contains(">Total Issues:<"));
    assert!(svg.contains(">12<"));
    assert!(svg.contains(">Contributed to:<"));
    assert!(svg.contains(">3<"));
}

#[test]
fn zero_snapshot_still_renders() {
    let svg = render_card(&MetricsSnapshot::default(), &text("last 365 days"));
    assert_eq!(svg.matches(r#"text-anchor="end">0<"#).count(), 5);
}

#[test]
fn title_is_escaped() {
    let svg = render_card(&snapshot(), &CardText { title: "<b>&".into(), window_label: "2026".into() });
    assert!(svg.contains("&lt;b&gt;&amp;"));
    assert!(!svg.contains("<b>&"));
}

#[test]
fn rows_fit_inside_canvas() {
    let offsets = row_offsets();
    assert!(offsets.windows(2).all(|w| w[0] + 16 <= w[1]));
    assert!(offsets.iter().all(|y| y + 16 <= CARD_HEIGHT));
}

//! Fixed-layout SVG template.
//!
//! Rows are stacked under the title and the whole block is centered
//! vertically inside the canvas:
//!
//! `top_margin = (CARD_HEIGHT - (TITLE_HEIGHT + ROWS * LINE_HEIGHT)) / 2`
//! `row_y(i)   = top_margin + TITLE_HEIGHT + i * LINE_HEIGHT`
//!
//! Existing embeds rely on these numbers; changing them changes every card.

use std::fmt::Write;

use crate::snapshot::MetricsSnapshot;

use super::icons;

pub const CARD_WIDTH: u32 = 495;
pub const CARD_HEIGHT: u32 = 195;

const TITLE_HEIGHT: u32 = 30;
const LINE_HEIGHT: u32 = 25;
const PADDING_X: u32 = 25;
const ROWS: u32 = 5;
const ICON_SIZE: u32 = 16;
const LABEL_OFFSET_X: u32 = 25;

const BG_COLOR: &str = "#0d1117";
const ACCENT_COLOR: &str = "#58a6ff";
const BORDER_COLOR: &str = "#30363d";
const TEXT_COLOR: &str = "#c9d1d9";

/// Text that is not a metric: the card title and the commit window label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardText {
    pub title: String,
    /// Appended to the commits row, e.g. `last 365 days` or `2026`.
    pub window_label: String,
}

fn top_margin() -> u32 {
    (CARD_HEIGHT - (TITLE_HEIGHT + ROWS * LINE_HEIGHT)) / 2
}

/// Vertical offset of each row group, top to bottom.
pub fn row_offsets() -> [u32; ROWS as usize] {
    let base = top_margin() + TITLE_HEIGHT;
    [0, 1, 2, 3, 4].map(|i| base + i * LINE_HEIGHT)
}

/// Render the card. Identical input gives byte-identical output.
pub fn render_card(snapshot: &MetricsSnapshot, text: &CardText) -> String {
    let commits_label = format!("Total Commits ({})", text.window_label);
    let rows: [(&str, &str, u64); ROWS as usize] = [
        (icons::STAR, "Total Stars Earned", snapshot.total_stars),
        (icons::COMMIT, commits_label.as_str(), snapshot.total_commits),
        (icons::PULL_REQUEST, "Total PRs", snapshot.total_prs),
        (icons::ISSUE, "Total Issues", snapshot.total_issues),
        (icons::REPO, "Contributed to", snapshot.total_contributed_to),
    ];

    let mut out = String::with_capacity(4096);
    let _ = write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" fill="none" role="img" aria-labelledby="card-title">"#,
        w = CARD_WIDTH,
        h = CARD_HEIGHT,
    );
    let _ = write!(out, r#"<title id="card-title">{}</title>"#, escape_xml(&text.title));
    let _ = write!(
        out,
        "<style>.title{{font:600 18px 'Segoe UI',Ubuntu,Sans-Serif;fill:{ACCENT_COLOR}}}\
         .stat{{font:600 14px 'Segoe UI',Ubuntu,Sans-Serif;fill:{TEXT_COLOR}}}\
         .icon{{fill:{ACCENT_COLOR}}}</style>"
    );
    let _ = write!(
        out,
        r#"<rect x="0.5" y="0.5" rx="4.5" width="{}" height="{}" fill="{BG_COLOR}" stroke="{BORDER_COLOR}"/>"#,
        CARD_WIDTH - 1,
        CARD_HEIGHT - 1,
    );
    let _ = write!(
        out,
        r#"<g transform="translate({PADDING_X}, {})"><text x="0" y="18" class="title">{}</text></g>"#,
        top_margin(),
        escape_xml(&text.title),
    );

    let value_x = CARD_WIDTH - 2 * PADDING_X;
    for ((icon, label, value), y) in rows.iter().zip(row_offsets()) {
        let _ = write!(
            out,
            r#"<g transform="translate({PADDING_X}, {y})"><svg class="icon" viewBox="0 0 16 16" width="{ICON_SIZE}" height="{ICON_SIZE}"><path fill-rule="evenodd" d="{icon}"/></svg><text class="stat" x="{LABEL_OFFSET_X}" y="12.5">{}:</text><text class="stat" x="{value_x}" y="12.5" text-anchor="end">{}</text></g>"#,
            escape_xml(label),
            group_thousands(*value),
        );
    }
    out.push_str("</svg>");
    out
}

fn group_thousands(v: u64) -> String {
    let digits = v.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_xml(r#"<a & "b">"#), "&lt;a &amp; &quot;b&quot;&gt;");
    }

    #[test]
    fn layout_is_centered() {
        assert_eq!(top_margin(), 20);
        assert_eq!(row_offsets(), [50, 75, 100, 125, 150]);
    }
}

//! Contribution time window.
//!
//! Deployments differ in whether "commits" means the trailing year or the
//! current calendar year, so the window is a configuration choice.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum ContributionWindow {
    /// `[now - 365 days, now]`.
    #[default]
    #[serde(rename = "trailing_365_days")]
    Trailing365Days,
    /// `[Jan 1 00:00 UTC of the current year, now]`.
    #[serde(rename = "calendar_year")]
    CalendarYear,
}

impl ContributionWindow {
    /// UTC range covered by the window at `now`.
    pub fn range(self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let from = match self {
            ContributionWindow::Trailing365Days => now - Duration::days(365),
            ContributionWindow::CalendarYear => start_of_year(now).unwrap_or(now),
        };
        (from, now)
    }

    /// Human label rendered next to the commit count.
    pub fn label(self, now: DateTime<Utc>) -> String {
        match self {
            ContributionWindow::Trailing365Days => "last 365 days".to_string(),
            ContributionWindow::CalendarYear => now.year().to_string(),
        }
    }
}

fn start_of_year(now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(now.year(), 1, 1)?
        .and_hms_opt(0, 0, 0)
        .map(|n| n.and_utc())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 30, 0).single().unwrap()
    }

    #[test]
    fn trailing_window_spans_365_days() {
        let now = at(2026, 10, 19);
        let (from, to) = ContributionWindow::Trailing365Days.range(now);
        assert_eq!(to, now);
        assert_eq!(to - from, Duration::days(365));
        assert_eq!(ContributionWindow::Trailing365Days.label(now), "last 365 days");
    }

    #[test]
    fn calendar_window_starts_on_new_year() {
        let now = at(2026, 10, 19);
        let (from, to) = ContributionWindow::CalendarYear.range(now);
        assert_eq!(from, Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).single().unwrap());
        assert_eq!(to, now);
        assert_eq!(ContributionWindow::CalendarYear.label(now), "2026");
    }
}

//! Minimal metrics registry for the card gateway.
//!
//! Dynamic labels are backed by `DashMap`. Labels are flattened into sorted
//! key vectors to keep deterministic ordering. Histogram buckets are fixed in
//! milliseconds since upstream calls are slow compared to local work.

use dashmap::DashMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::time::Duration;

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn label_key(labels: &[(&str, &str)]) -> Vec<(String, String)> {
    let mut key: Vec<(String, String)> = labels
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    key.sort();
    key
}

fn label_str(key: &[(String, String)]) -> String {
    key.iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect::<Vec<_>>()
        .join(",")
}

#[derive(Default)]
pub struct CounterVec {
    map: DashMap<Vec<(String, String)>, AtomicU64>,
}

impl CounterVec {
    /// Increment by 1.
    pub fn inc(&self, labels: &[(&str, &str)]) {
        self.add(labels, 1);
    }

    pub fn add(&self, labels: &[(&str, &str)], v: u64) {
        let counter = self
            .map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(v, Ordering::Relaxed);
    }

    /// Current value, 0 when the label set was never touched.
    pub fn get(&self, labels: &[(&str, &str)]) -> u64 {
        self.map
            .get(&label_key(labels))
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {} counter", name);
        for r in self.map.iter() {
            let val = r.value().load(Ordering::Relaxed);
            let _ = writeln!(out, "{}{{{}}} {}", name, label_str(r.key()), val);
        }
    }
}

#[derive(Default)]
pub struct GaugeVec {
    map: DashMap<Vec<(String, String)>, AtomicI64>,
}

impl GaugeVec {
    pub fn inc(&self, labels: &[(&str, &str)]) { self.add(labels, 1); }
    pub fn dec(&self, labels: &[(&str, &str)]) { self.add(labels, -1); }

    pub fn add(&self, labels: &[(&str, &str)], v: i64) {
        let gauge = self
            .map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicI64::new(0));
        gauge.fetch_add(v, Ordering::Relaxed);
    }

    pub fn get(&self, labels: &[(&str, &str)]) -> i64 {
        self.map
            .get(&label_key(labels))
            .map(|g| g.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Increment the unlabelled series now and decrement it when the guard
    /// drops, including when the owning future is cancelled.
    pub fn track(&self) -> GaugeGuard<'_> {
        self.inc(&[]);
        GaugeGuard { gauge: self }
    }

    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {} gauge", name);
        for r in self.map.iter() {
            let val = r.value().load(Ordering::Relaxed);
            let _ = writeln!(out, "{}{{{}}} {}", name, label_str(r.key()), val);
        }
    }
}

pub struct GaugeGuard<'a> {
    gauge: &'a GaugeVec,
}

impl Drop for GaugeGuard<'_> {
    fn drop(&mut self) {
        self.gauge.dec(&[]);
    }
}

// 10ms .. 30s
const BUCKETS_MILLIS: [u64; 10] = [10, 50, 100, 250, 500, 1_000, 2_500, 5_000, 10_000, 30_000];

#[derive(Default)]
struct AtomicHistogram {
    count: AtomicU64,
    sum: AtomicU64,
    buckets: [AtomicU64; 10],
}

#[derive(Default)]
pub struct HistogramVec {
    map: DashMap<Vec<(String, String)>, AtomicHistogram>,
}

impl HistogramVec {
    /// Observe a duration and increment cumulative buckets (millisecond scale).
    pub fn observe(&self, labels: &[(&str, &str)], duration: Duration) {
        let hist = self
            .map
            .entry(label_key(labels))
            .or_insert_with(AtomicHistogram::default);
        let millis = duration.as_millis() as u64;

        hist.count.fetch_add(1, Ordering::Relaxed);
        hist.sum.fetch_add(millis, Ordering::Relaxed);

        for (i, &b) in BUCKETS_MILLIS.iter().enumerate() {
            if millis <= b {
                hist.buckets[i].fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {} histogram", name);
        for r in self.map.iter() {
            let hist = r.value();
            let labels = label_str(r.key());
            let prefix = if labels.is_empty() { String::new() } else { format!("{},", labels) };

            for (i, &le) in BUCKETS_MILLIS.iter().enumerate() {
                let count = hist.buckets[i].load(Ordering::Relaxed);
                let _ = writeln!(out, "{}_bucket{{{}le=\"{}\"}} {}", name, prefix, le, count);
            }
            let count = hist.count.load(Ordering::Relaxed);
            let _ = writeln!(out, "{}_bucket{{{}le=\"+Inf\"}} {}", name, prefix, count);

            let sum = hist.sum.load(Ordering::Relaxed);
            let _ = writeln!(out, "{}_sum{{{}}} {}", name, labels, sum);
            let _ = writeln!(out, "{}_count{{{}}} {}", name, labels, count);
        }
    }
}

#[derive(Default)]
pub struct CardMetrics {
    /// Rendered cards by `cacheable`.
    pub card_requests: CounterVec,
    /// Debug status payloads served instead of a card.
    pub debug_requests: CounterVec,
    /// Upstream fetches by `source` and `outcome` (`ok`, `degraded`, `fallback`).
    pub upstream_fetches: CounterVec,
    pub upstream_duration: HistogramVec, // In Milliseconds
    pub reconcile_decisions: CounterVec,
    pub store_errors: CounterVec,
    pub cards_in_flight: GaugeVec,
    draining: AtomicBool,
}

impl CardMetrics {
    pub fn set_draining(&self) { self.draining.store(true, Ordering::Relaxed); }
    pub fn is_draining(&self) -> bool { self.draining.load(Ordering::Relaxed) }

    /// Render all registered metrics plus any extra lines provided by callers.
    pub fn render(&self, extra: &[(&str, u64)]) -> String {
        let mut out = String::new();
        self.card_requests.render("statcard_card_requests_total", &mut out);
        self.debug_requests.render("statcard_debug_requests_total", &mut out);
        self.upstream_fetches.render("statcard_upstream_fetches_total", &mut out);
        self.upstream_duration.render("statcard_upstream_duration_millis", &mut out);
        self.reconcile_decisions.render("statcard_reconcile_decisions_total", &mut out);
        self.store_errors.render("statcard_store_errors_total", &mut out);
        self.cards_in_flight.render("statcard_cards_in_flight", &mut out);

        let _ = writeln!(out, "# TYPE statcard_draining gauge\nstatcard_draining {}", if self.is_draining() { 1 } else { 0 });
        for (k, v) in extra { let _ = writeln!(out, "{} {}", k, v); }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_labels_are_order_insensitive() {
        let c = CounterVec::default();
        c.inc(&[("a", "1"), ("b", "2")]);
        c.inc(&[("b", "2"), ("a", "1")]);
        assert_eq!(c.get(&[("a", "1"), ("b", "2")]), 2);
    }

    #[test]
    fn histogram_buckets_are_cumulative() {
        let h = HistogramVec::default();
        h.observe(&[("source", "x")], Duration::from_millis(40));
        let mut out = String::new();
        h.render("h", &mut out);
        assert!(out.contains("h_bucket{source=\"x\",le=\"10\"} 0"));
        assert!(out.contains("h_bucket{source=\"x\",le=\"50\"} 1"));
        assert!(out.contains("h_bucket{source=\"x\",le=\"+Inf\"} 1"));
        assert!(out.contains("h_sum{source=\"x\"} 40"));
    }

    #[test]
    fn gauge_guard_releases_on_drop() {
        let g = GaugeVec::default();
        {
            let _a = g.track();
            let _b = g.track();
            assert_eq!(g.get(&[]), 2);
        }
        assert_eq!(g.get(&[]), 0);
    }

    #[test]
    fn render_includes_draining_and_extra() {
        let m = CardMetrics::default();
        m.set_draining();
        let out = m.render(&[("statcard_credential_present", 1)]);
        assert!(out.contains("statcard_draining 1"));
        assert!(out.contains("statcard_credential_present 1"));
    }
}

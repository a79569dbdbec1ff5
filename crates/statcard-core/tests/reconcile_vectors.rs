//! Reconciliation sequences replayed against a single cache key.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::fs;

use serde::Deserialize;
use statcard_core::reconcile;

#[derive(Debug, Deserialize)]
struct Sequence {
    description: String,
    seed: Option<u64>,
    calculated: Vec<u64>,
    expect_displayed: Vec<u64>,
    expect_cacheable: Vec<bool>,
    expect_stored: Option<u64>,
}

fn load() -> Vec<Sequence> {
    let s = fs::read_to_string("tests/vectors/reconcile_sequences.json").unwrap();
    serde_json::from_str(&s).expect("invalid vector file")
}

#[test]
fn replay_sequences() {
    for seq in load() {
        let mut stored = seq.seed;
        let mut displayed = Vec::new();
        let mut cacheable = Vec::new();

        for &calculated in &seq.calculated {
            let r = reconcile(calculated, stored);
            if let Some(v) = r.cache_update {
                stored = Some(v);
            }
            displayed.push(r.displayed);
            cacheable.push(r.is_cacheable());
        }

        assert_eq!(displayed, seq.expect_displayed, "{}", seq.description);
        assert_eq!(cacheable, seq.expect_cacheable, "{}", seq.description);
        assert_eq!(stored, seq.expect_stored, "{}", seq.description);
    }
}

#[test]
fn stored_value_is_monotonic() {
    for seq in load() {
        let mut stored = seq.seed;
        for &calculated in &seq.calculated {
            let before = stored.unwrap_or(0);
            if let Some(v) = reconcile(calculated, stored).cache_update {
                stored = Some(v);
            }
            assert!(stored.unwrap_or(0) >= before, "{}", seq.description);
        }
    }
}

//! Star total reconciliation.
//!
//! The public star-count source occasionally answers with transient zeros or
//! undercounts. Any positive total seen before for a (user, org) key is
//! treated as a lower bound on the truth, so the displayed total never
//! regresses while the process lives.
//!
//! A real decrease (deleted repository, removed stars) is masked once a higher
//! value has been cached for the key.

/// Which row of the decision table fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    /// `calculated > stored`: show and remember the fresh value.
    Promote,
    /// `calculated == 0`, `stored > 0`: the fetch most likely failed.
    HoldOnZero,
    /// Nothing known, nothing fetched.
    Empty,
    /// `0 < calculated < stored`: treated as an undercount.
    HoldOnUndercount,
    /// `calculated == stored > 0`.
    Confirm,
}

impl Decision {
    /// Stable label for logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            Decision::Promote => "promote",
            Decision::HoldOnZero => "hold_on_zero",
            Decision::Empty => "empty",
            Decision::HoldOnUndercount => "hold_on_undercount",
            Decision::Confirm => "confirm",
        }
    }
}

/// Outcome of one reconciliation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciled {
    /// Total to render.
    pub displayed: u64,
    /// Value to write back under the key, if any.
    pub cache_update: Option<u64>,
    pub decision: Decision,
}

impl Reconciled {
    /// Whether a CDN may keep the rendered card.
    ///
    /// Only a positive total that came from the fresh fetch qualifies; a held
    /// or empty total must not be pinned downstream.
    pub fn is_cacheable(&self) -> bool {
        matches!(self.decision, Decision::Promote | Decision::Confirm)
    }
}

/// Decide what to display for a freshly `calculated` total given the `stored`
/// maximum (`None` when the key was never seen).
///
/// Total over its inputs; rows are evaluated in order.
pub fn reconcile(calculated: u64, stored: Option<u64>) -> Reconciled {
    let previous = stored.unwrap_or(0);

    if calculated > previous {
        return Reconciled {
            displayed: calculated,
            cache_update: Some(calculated),
            decision: Decision::Promote,
        };
    }
    if calculated == 0 && previous > 0 {
        return Reconciled {
            displayed: previous,
            cache_update: None,
            decision: Decision::HoldOnZero,
        };
    }
    if calculated == 0 {
        return Reconciled {
            displayed: 0,
            cache_update: None,
            decision: Decision::Empty,
        };
    }
    if calculated < previous {
        return Reconciled {
            displayed: previous,
            cache_update: None,
            decision: Decision::HoldOnUndercount,
        };
    }

    // calculated == previous > 0
    let cache_update = match stored {
        None | Some(0) => Some(calculated),
        Some(_) => None,
    };
    Reconciled {
        displayed: calculated,
        cache_update,
        decision: Decision::Confirm,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Feed a sequence through one key, the way the gateway does.
    fn run(seq: &[u64]) -> (Vec<u64>, Option<u64>) {
        let mut cache: HashMap<&str, u64> = HashMap::new();
        let mut shown = Vec::with_capacity(seq.len());
        for &calculated in seq {
            let r = reconcile(calculated, cache.get("k").copied());
            if let Some(v) = r.cache_update {
                cache.insert("k", v);
            }
            shown.push(r.displayed);
        }
        (shown, cache.get("k").copied())
    }

    #[test]
    fn empty_cache_promotes() {
        let r = reconcile(27, None);
        assert_eq!(r.displayed, 27);
        assert_eq!(r.cache_update, Some(27));
        assert!(r.is_cacheable());
    }

    #[test]
    fn zero_holds_stored_and_is_not_cacheable() {
        let r = reconcile(0, Some(27));
        assert_eq!(r.displayed, 27);
        assert_eq!(r.cache_update, None);
        assert_eq!(r.decision, Decision::HoldOnZero);
        assert!(!r.is_cacheable());
    }

    #[test]
    fn undercount_holds_stored() {
        let r = reconcile(15, Some(27));
        assert_eq!(r.displayed, 27);
        assert_eq!(r.cache_update, None);
        assert!(!r.is_cacheable());
    }

    #[test]
    fn increase_promotes() {
        let r = reconcile(40, Some(27));
        assert_eq!(r.displayed, 40);
        assert_eq!(r.cache_update, Some(40));
        assert!(r.is_cacheable());
    }

    #[test]
    fn both_zero_is_empty() {
        for stored in [None, Some(0)] {
            let r = reconcile(0, stored);
            assert_eq!(r.displayed, 0);
            assert_eq!(r.cache_update, None);
            assert_eq!(r.decision, Decision::Empty);
            assert!(!r.is_cacheable());
        }
    }

    #[test]
    fn equal_confirms_without_rewrite() {
        let r = reconcile(27, Some(27));
        assert_eq!(r.displayed, 27);
        assert_eq!(r.cache_update, None);
        assert_eq!(r.decision, Decision::Confirm);
        assert!(r.is_cacheable());
    }

    #[test]
    fn deterministic_over_small_grid() {
        for calculated in 0..20u64 {
            for stored in (0..20u64).map(Some).chain([None]) {
                let a = reconcile(calculated, stored);
                let b = reconcile(calculated, stored);
                assert_eq!(a, b);
                assert!(a.displayed >= calculated);
                assert!(a.displayed >= stored.unwrap_or(0));
            }
        }
    }

    #[test]
    fn displayed_never_regresses_after_first_positive() {
        let (shown, cached) = run(&[0, 5, 0, 3, 9, 9, 0, 1, 12, 4]);
        assert_eq!(shown, vec![0, 5, 5, 5, 9, 9, 9, 9, 12, 12]);
        assert_eq!(cached, Some(12));
        assert!(shown.windows(2).skip(1).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn repeated_zero_never_mutates() {
        let (shown, cached) = run(&[27, 0, 0, 0]);
        assert_eq!(shown, vec![27, 27, 27, 27]);
        assert_eq!(cached, Some(27));

        let (shown, cached) = run(&[0, 0, 0]);
        assert_eq!(shown, vec![0, 0, 0]);
        assert_eq!(cached, None);
    }
}

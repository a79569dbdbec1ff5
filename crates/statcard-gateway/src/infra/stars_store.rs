//! Highest-observed star totals, keyed by composite (user, org) key.
//!
//! The trait is the seam for a durable backend; the in-memory store lives for
//! the process lifetime and is never evicted.

use std::collections::HashMap;

use async_trait::async_trait;
use dashmap::DashMap;

use statcard_core::error::Result;
use statcard_core::normalize_key;

#[async_trait]
pub trait HighestStarsStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<u64>>;
    async fn set(&self, key: &str, value: u64) -> Result<()>;
}

#[derive(Default)]
pub struct InMemoryStarsStore {
    entries: DashMap<String, u64>,
}

impl InMemoryStarsStore {
    pub fn new() -> Self {
        Self { entries: DashMap::new() }
    }

    pub fn with_seed(seed: impl IntoIterator<Item = (String, u64)>) -> Self {
        let this = Self::new();
        for (key, value) in seed {
            this.raise(key, value);
        }
        this
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // Stored values only ever go up.
    fn raise(&self, key: String, value: u64) {
        self.entries
            .entry(key)
            .and_modify(|v| *v = (*v).max(value))
            .or_insert(value);
    }
}

#[async_trait]
impl HighestStarsStore for InMemoryStarsStore {
    async fn get(&self, key: &str) -> Result<Option<u64>> {
        Ok(self.entries.get(key).map(|v| *v.value()))
    }

    async fn set(&self, key: &str, value: u64) -> Result<()> {
        self.raise(key.to_string(), value);
        Ok(())
    }
}

/// Extract seed entries from `(name, value)` pairs: names starting with
/// `prefix` map the remainder (a composite key) to an integer total.
/// Entries that do not parse are skipped with a warning.
pub fn parse_seed_vars<I>(prefix: &str, vars: I) -> HashMap<String, u64>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut out = HashMap::new();
    if prefix.is_empty() {
        return out;
    }
    for (name, value) in vars {
        let Some(key) = name.strip_prefix(prefix) else { continue; };
        if key.is_empty() {
            continue;
        }
        match value.trim().parse::<u64>() {
            Ok(v) => {
                out.insert(normalize_key(key), v);
            }
            Err(e) => {
                tracing::warn!(var = %name, error = %e, "ignoring non-integer star seed");
            }
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn absent_key_reads_none() {
        let store = InMemoryStarsStore::new();
        assert_eq!(store.get("octocat_github").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_never_lowers() {
        let store = InMemoryStarsStore::new();
        store.set("k", 27).await.unwrap();
        store.set("k", 15).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(27));
        store.set("k", 40).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(40));
    }

    #[tokio::test]
    async fn seeded_entries_are_visible() {
        let store = InMemoryStarsStore::with_seed([("a_b".to_string(), 12)]);
        assert_eq!(store.get("a_b").await.unwrap(), Some(12));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn seed_vars_filter_by_prefix() {
        let vars = vec![
            ("HIGHEST_STARS_octocat_github".to_string(), "27".to_string()),
            ("HIGHEST_STARS_bad_value".to_string(), "lots".to_string()),
            ("HIGHEST_STARS_".to_string(), "3".to_string()),
            ("PATH".to_string(), "/usr/bin".to_string()),
        ];
        let seeds = parse_seed_vars("HIGHEST_STARS_", vars);
        assert_eq!(seeds.len(), 1);
        assert_eq!(seeds.get("octocat_github"), Some(&27));
    }

    #[test]
    fn seed_var_keys_are_lowercased() {
        let vars = vec![("HIGHEST_STARS_OctoCat_GitHub".to_string(), "27".to_string())];
        let seeds = parse_seed_vars("HIGHEST_STARS_", vars);
        assert_eq!(seeds.get("octocat_github"), Some(&27));
    }
}

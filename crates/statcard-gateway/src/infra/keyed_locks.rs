use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per key, created on first use.
///
/// Serializes the read-reconcile-write step for a composite key while letting
/// different keys proceed in parallel. An entry lives only while someone
/// holds or waits for it, so the map stays as small as the set of keys
/// currently being reconciled.
#[derive(Default)]
pub struct KeyedLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

/// Held lock for one key. Releasing it drops the map entry once nobody else
/// is queued on the same key.
pub struct KeyGuard<'a> {
    locks: &'a DashMap<String, Arc<Mutex<()>>>,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self { locks: DashMap::new() }
    }

    pub async fn lock(&self, key: &str) -> KeyGuard<'_> {
        // Clone the Arc out so the shard guard is released before awaiting.
        let m = self
            .locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = m.lock_owned().await;
        KeyGuard {
            locks: &self.locks,
            key: key.to_string(),
            guard: Some(guard),
        }
    }

    /// Number of keys currently held or waited on.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        // The guard owns one Arc; release it first so only the map's remains.
        drop(self.guard.take());
        // Waiters hold their own clone, which keeps the entry alive for them.
        let _ = self
            .locks
            .remove_if(&self.key, |_, m| Arc::strong_count(m) == 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_key_is_exclusive() {
        let locks = KeyedLocks::new();
        let _g = locks.lock("k").await;
        let second = tokio::time::timeout(Duration::from_millis(20), locks.lock("k")).await;
        assert!(second.is_err());
    }

    #[tokio::test]
    async fn different_keys_do_not_block() {
        let locks = KeyedLocks::new();
        let _a = locks.lock("a").await;
        let b = tokio::time::timeout(Duration::from_millis(20), locks.lock("b")).await;
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn released_keys_leave_no_entries() {
        let locks = KeyedLocks::new();
        for i in 0..10_000 {
            let _g = locks.lock(&format!("user{i}_org")).await;
        }
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn entry_survives_while_a_waiter_is_queued() {
        let locks = Arc::new(KeyedLocks::new());
        let held = locks.lock("k").await;

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _g = locks.lock("k").await;
                locks.len()
            })
        };
        // Let the waiter queue up behind the held guard.
        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(held);

        let seen_while_held = waiter.await.unwrap_or(usize::MAX);
        assert_eq!(seen_while_held, 1);
        assert!(locks.is_empty());
    }
}

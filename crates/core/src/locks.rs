//! Keyed mutual exclusion.
//!
//! [`KeyedLocks`] hands out one async mutex per key. Slots are created on
//! first use and dropped again once the last holder or waiter lets go, so the
//! table only ever contains keys that are currently contended. Work on
//! distinct keys runs concurrently; work on the same key is serialized.
//!
//! Used for file paths in [`crate::file_store`] and for `(user, kind)` pairs in
//! [`crate::recency`].

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Slot = Arc<AsyncMutex<()>>;

/// A table of lazily created, reference-counted per-key locks.
pub struct KeyedLocks<K> {
    slots: Mutex<HashMap<K, Slot>>,
}

/// Exclusive hold on one key, or a pending claim while [`KeyedLocks::lock`]
/// is still waiting. Dropping either may remove the slot from the table.
pub struct KeyedGuard<'a, K>
where
    K: Eq + Hash + Clone,
{
    table: &'a KeyedLocks<K>,
    key: K,
    guard: Option<OwnedMutexGuard<()>>,
}

impl<K> KeyedLocks<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Wait for exclusive access to `key`.
    ///
    /// The returned guard exists before the wait starts, so a caller that
    /// gives up while queued still releases its claim on the slot.
    pub async fn lock(&self, key: K) -> KeyedGuard<'_, K> {
        let slot = {
            let mut slots = self.slots();
            Arc::clone(slots.entry(key.clone()).or_default())
        };
        let mut held = KeyedGuard {
            table: self,
            key,
            guard: None,
        };
        // On cancellation the pending acquisition (and its `Arc`) drops
        // before `held`, so the count check in `Drop` sees it gone.
        held.guard = Some(slot.lock_owned().await);
        held
    }

    /// Number of keys that currently have a holder or waiter.
    pub fn active_keys(&self) -> usize {
        self.slots().len()
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<K, Slot>> {
        // The map is never left half-updated, so a poisoned lock is still usable.
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<K> Default for KeyedLocks<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Drop for KeyedGuard<'_, K>
where
    K: Eq + Hash + Clone,
{
    fn drop(&mut self) {
        // Release the async mutex before inspecting the reference count.
        drop(self.guard.take());

        let mut slots = self.table.slots();
        let idle = slots
            .get(&self.key)
            .is_some_and(|slot| Arc::strong_count(slot) == 1);
        if idle {
            slots.remove(&self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn slot_is_removed_after_release() {
        let locks = KeyedLocks::new();
        {
            let _guard = locks.lock("a").await;
            assert_eq!(locks.active_keys(), 1);
        }
        assert_eq!(locks.active_keys(), 0);
    }

    #[tokio::test]
    async fn distinct_keys_do_not_block_each_other() {
        let locks = KeyedLocks::new();
        let _a = locks.lock("a").await;
        let b = tokio::time::timeout(Duration::from_millis(100), locks.lock("b")).await;
        assert!(b.is_ok(), "lock on a different key must not wait");
        assert_eq!(locks.active_keys(), 2);
    }

    #[tokio::test]
    async fn same_key_waits_for_release() {
        let locks = KeyedLocks::new();
        let first = locks.lock("a").await;

        let blocked = tokio::time::timeout(Duration::from_millis(50), locks.lock("a")).await;
        assert!(blocked.is_err(), "second lock on the same key must wait");

        drop(first);
        let second = tokio::time::timeout(Duration::from_millis(100), locks.lock("a")).await;
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn abandoned_waiter_does_not_leave_slot_behind() {
        let locks = KeyedLocks::new();
        let first = locks.lock("a").await;

        let mut waiter = Box::pin(locks.lock("a"));
        let queued = tokio::time::timeout(Duration::from_millis(20), &mut waiter).await;
        assert!(queued.is_err(), "waiter must still be queued");

        drop(first);
        drop(waiter);
        assert_eq!(locks.active_keys(), 0);
    }

    #[tokio::test]
    async fn waiter_timing_out_while_held_keeps_holder_slot() {
        let locks = KeyedLocks::new();
        let first = locks.lock("a").await;

        let timed_out = tokio::time::timeout(Duration::from_millis(20), locks.lock("a")).await;
        assert!(timed_out.is_err());
        assert_eq!(locks.active_keys(), 1);

        drop(first);
        assert_eq!(locks.active_keys(), 0);
    }

    #[tokio::test]
    async fn same_key_sections_never_overlap() {
        let locks = Arc::new(KeyedLocks::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let max_inside = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let locks = Arc::clone(&locks);
            let inside = Arc::clone(&inside);
            let max_inside = Arc::clone(&max_inside);
            handles.push(tokio::spawn(async move {
                let _guard = locks.lock(7_u32).await;
                let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                max_inside.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                inside.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
        assert_eq!(locks.active_keys(), 0);
    }
}

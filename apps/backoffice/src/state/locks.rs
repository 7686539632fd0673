//! # Store Locks
//!
//! One async mutex per store. Commands that read a sale or the catalog,
//! change it, and write it back hold the store's lock for the whole cycle,
//! so two payments on the same sale can never both pass the balance check.
//!
//! ```text
//! create_sale(s1) ──► lock(s1) ──► load ─► build ─► insert ──► unlock
//! add_payment(s1) ──► lock(s1) ····waits····························► ...
//! add_payment(s2) ──► lock(s2) ──► runs in parallel with s1
//! ```
//!
//! An entry lives only while a guard or a waiter holds its `Arc`. Idle
//! entries are dropped on the next `lock` call, so the map stays as small as
//! the number of stores busy at once.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::trace;

/// Per-store mutual exclusion.
#[derive(Debug, Default)]
pub struct StoreLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl StoreLocks {
    pub fn new() -> Self {
        StoreLocks::default()
    }

    /// Waits for and takes the lock of `store_id`.
    pub async fn lock(&self, store_id: &str) -> OwnedMutexGuard<()> {
        let store_lock = {
            let mut locks = self.locks.lock().await;
            locks.retain(|id, lock| id == store_id || Arc::strong_count(lock) > 1);
            locks
                .entry(store_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        trace!(store_id = %store_id, "Acquiring store lock");
        store_lock.lock_owned().await
    }

    /// Number of stores with a live entry.
    pub(crate) async fn tracked(&self) -> usize {
        self.locks.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_store_waits() {
        let locks = Arc::new(StoreLocks::new());
        let guard = locks.lock("s1").await;

        let other = locks.clone();
        let waiter = tokio::spawn(async move {
            let _guard = other.lock("s1").await;
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn test_different_stores_do_not_block() {
        let locks = StoreLocks::new();
        let _s1 = locks.lock("s1").await;
        let _s2 = locks.lock("s2").await;
    }

    #[tokio::test]
    async fn test_idle_entries_are_pruned() {
        let locks = StoreLocks::new();
        let held = locks.lock("busy").await;

        for i in 0..100 {
            let _guard = locks.lock(&format!("store-{}", i)).await;
        }

        // The busy store plus the last one locked
        assert_eq!(locks.tracked().await, 2);

        drop(held);
        let _guard = locks.lock("s1").await;
        assert_eq!(locks.tracked().await, 1);
    }

    #[tokio::test]
    async fn test_pruning_keeps_waiters_exclusive() {
        let locks = Arc::new(StoreLocks::new());
        let guard = locks.lock("s1").await;

        let other = locks.clone();
        let waiter = tokio::spawn(async move {
            let _guard = other.lock("s1").await;
        });
        tokio::time::sleep(Duration::from_millis(20)).await;

        // Locking other stores must not drop the contended entry
        let _s2 = locks.lock("s2").await;
        assert!(!waiter.is_finished());

        drop(guard);
        waiter.await.unwrap();
    }
}

//! Per-cashbox lock registry.
//!
//! Serializes all in-process writers of a cashbox behind a keyed async
//! mutex. Acquisition is bounded: a writer that cannot obtain the lock
//! within the configured window fails with a retryable `LockTimeout`
//! instead of blocking indefinitely. Different cashboxes never contend.
//!
//! Cross-process serialization is handled separately by the `SELECT ...
//! FOR UPDATE` re-read the ledger service performs inside its database
//! transaction.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use registra_core::ledger::LedgerError;

/// Keyed mutual exclusion for cashbox writers.
#[derive(Debug)]
pub struct LockRegistry {
    locks: DashMap<Uuid, Arc<Mutex<()>>>,
    timeout: Duration,
}

impl LockRegistry {
    /// Creates a registry with the given acquisition bound.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            locks: DashMap::new(),
            timeout,
        }
    }

    /// Acquires the exclusive lock for a cashbox.
    ///
    /// The guard releases the lock on drop.
    ///
    /// # Errors
    ///
    /// Returns `LockTimeout` if the lock cannot be obtained within the
    /// configured bound; no state has changed in that case.
    pub async fn acquire(&self, cashbox_id: Uuid) -> Result<OwnedMutexGuard<()>, LedgerError> {
        let lock = {
            // The DashMap shard guard must drop before awaiting.
            let entry = self.locks.entry(cashbox_id).or_default();
            Arc::clone(entry.value())
        };

        tokio::time::timeout(self.timeout, lock.lock_owned())
            .await
            .map_err(|_| LedgerError::LockTimeout(cashbox_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_acquire_serializes_writers() {
        let registry = Arc::new(LockRegistry::new(Duration::from_secs(5)));
        let cashbox_id = Uuid::now_v7();
        let counter = Arc::new(AtomicU64::new(0));

        const TASKS: u64 = 100;
        let mut handles = Vec::new();

        for _ in 0..TASKS {
            let registry = Arc::clone(&registry);
            let counter = Arc::clone(&counter);
            handles.push(tokio::spawn(async move {
                let _guard = registry.acquire(cashbox_id).await.unwrap();
                // Non-atomic read-modify-write: lost updates would show up
                // without the lock.
                let seen = counter.load(Ordering::SeqCst);
                tokio::task::yield_now().await;
                counter.store(seen + 1, Ordering::SeqCst);
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(counter.load(Ordering::SeqCst), TASKS);
    }

    #[tokio::test]
    async fn test_acquire_times_out_while_held() {
        let registry = LockRegistry::new(Duration::from_millis(50));
        let cashbox_id = Uuid::now_v7();

        let guard = registry.acquire(cashbox_id).await.unwrap();
        let err = registry.acquire(cashbox_id).await.unwrap_err();
        assert!(matches!(err, LedgerError::LockTimeout(id) if id == cashbox_id));

        drop(guard);
        assert!(registry.acquire(cashbox_id).await.is_ok());
    }

    #[tokio::test]
    async fn test_distinct_cashboxes_do_not_contend() {
        let registry = LockRegistry::new(Duration::from_millis(50));

        let _guard_a = registry.acquire(Uuid::now_v7()).await.unwrap();
        // Holding A's lock must not block B.
        assert!(registry.acquire(Uuid::now_v7()).await.is_ok());
    }
}

//! Per-fund mutual exclusion for withdrawals.

use std::sync::Arc;

use dashmap::DashMap;
use stokvel_shared::types::StokvelId;
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockTable = DashMap<StokvelId, Arc<Mutex<()>>>;

/// One async mutex per fund with a withdrawal in flight.
///
/// Withdrawals against the same fund queue behind each other; different
/// funds never contend. A fund's entry is dropped once nobody holds or
/// waits on it.
#[derive(Debug, Default, Clone)]
pub struct FundLocks {
    locks: Arc<LockTable>,
}

impl FundLocks {
    /// Creates an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `stokvel_id`.
    pub async fn acquire(&self, stokvel_id: StokvelId) -> FundGuard {
        // Clone the Arc out so the shard lock is released before awaiting.
        let lock = self
            .locks
            .entry(stokvel_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        FundGuard {
            guard: Some(lock.lock_owned().await),
            locks: Arc::clone(&self.locks),
            stokvel_id,
        }
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.locks.len()
    }
}

/// Exclusive access to one fund; released on drop.
#[derive(Debug)]
pub struct FundGuard {
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<LockTable>,
    stokvel_id: StokvelId,
}

impl Drop for FundGuard {
    fn drop(&mut self) {
        self.guard.take();
        // Waiters clone the Arc under the shard lock, so a count of one
        // means the table holds the only reference.
        self.locks
            .remove_if(&self.stokvel_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

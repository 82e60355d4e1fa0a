//! Keyed in-process serialization of balance mutations.
//!
//! Each wallet gets its own async mutex, created on first use and dropped from
//! the table once no lease or waiter refers to it. Operations on the same
//! wallet run one at a time; operations on different wallets do not wait for
//! each other.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct BalanceGuard {
    locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl BalanceGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other lease for `wallet_id` is alive.
    ///
    /// Dropping the returned future while it waits gives up the slot and
    /// cleans up the table entry like a normal release.
    pub async fn acquire(&self, wallet_id: Uuid) -> WalletLease<'_> {
        let lock = self.locks.entry(wallet_id).or_default().clone();
        let mut lease = WalletLease {
            locks: &self.locks,
            wallet_id,
            lock: Some(lock.clone()),
            guard: None,
        };
        // Declared after `lease` so a cancelled wait drops it first.
        let acquiring = lock.lock_owned();
        lease.guard = Some(acquiring.await);
        lease
    }

    /// Number of wallets that currently have a lease or a waiter.
    pub fn tracked_wallets(&self) -> usize {
        self.locks.len()
    }
}

/// Exclusive right to mutate one wallet's balance. Released on drop.
#[derive(Debug)]
pub struct WalletLease<'a> {
    locks: &'a DashMap<Uuid, Arc<Mutex<()>>>,
    wallet_id: Uuid,
    lock: Option<Arc<Mutex<()>>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl WalletLease<'_> {
    pub fn wallet_id(&self) -> Uuid {
        self.wallet_id
    }
}

impl Drop for WalletLease<'_> {
    fn drop(&mut self) {
        self.guard.take();
        self.lock.take();
        // Only the table's own reference left: nobody holds or waits for this wallet.
        self.locks
            .remove_if(&self.wallet_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

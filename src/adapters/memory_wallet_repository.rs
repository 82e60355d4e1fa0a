//! In-memory implementation of WalletRepository.
//!
//! Writes made through a unit of work are staged and only applied, all at once,
//! on commit. Row locks are emulated with one async mutex per wallet that the
//! unit holds until it is committed or dropped. Faults can be injected to
//! exercise the rollback paths.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::OwnedMutexGuard;
use uuid::Uuid;

use crate::domain::{OperationType, TransactionRecord, Wallet};
use crate::ports::{UnitOfWork, WalletError, WalletRepository, WalletResult};

/// Failure modes the in-memory store can be told to simulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fault {
    FailUpdate,
    FailInsert,
    FailCommit,
    /// The balance update matches no row, as if the wallet vanished mid-transaction.
    UpdateMatchesNoRows,
}

#[derive(Default)]
struct LedgerState {
    wallets: HashMap<Uuid, Wallet>,
    transactions: Vec<TransactionRecord>,
    row_locks: HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>,
    faults: HashSet<Fault>,
    commit_delay: Option<Duration>,
}

#[derive(Clone, Default)]
pub struct InMemoryWalletRepository {
    state: Arc<Mutex<LedgerState>>,
}

impl InMemoryWalletRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, LedgerState> {
        // A panic while holding the lock cannot leave staged writes half-applied.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn create_wallet(&self, balance: BigDecimal) -> Wallet {
        let wallet = Wallet::new(balance);
        self.state().wallets.insert(wallet.id, wallet.clone());
        wallet
    }

    pub fn wallet(&self, id: Uuid) -> Option<Wallet> {
        self.state().wallets.get(&id).cloned()
    }

    pub fn transactions_for(&self, wallet_id: Uuid) -> Vec<TransactionRecord> {
        self.state()
            .transactions
            .iter()
            .filter(|record| record.wallet_id == wallet_id)
            .cloned()
            .collect()
    }

    pub fn transaction_count(&self) -> usize {
        self.state().transactions.len()
    }

    pub fn inject(&self, fault: Fault) {
        self.state().faults.insert(fault);
    }

    pub fn clear_faults(&self) {
        self.state().faults.clear();
    }

    /// Makes every later commit sleep for `delay` before applying its writes.
    pub fn delay_commit(&self, delay: Duration) {
        self.state().commit_delay = Some(delay);
    }

    fn has_fault(&self, fault: Fault) -> bool {
        self.state().faults.contains(&fault)
    }
}

fn injected(what: &str) -> WalletError {
    WalletError::Store(sqlx::Error::Protocol(format!("injected failure: {}", what)))
}

#[async_trait]
impl WalletRepository for InMemoryWalletRepository {
    async fn get_wallet(&self, id: Uuid) -> WalletResult<Wallet> {
        self.wallet(id).ok_or(WalletError::NotFound(id))
    }

    async fn begin(&self) -> WalletResult<Box<dyn UnitOfWork>> {
        Ok(Box::new(InMemoryUnitOfWork {
            store: self.clone(),
            row_locks: Vec::new(),
            staged_balances: HashMap::new(),
            staged_records: Vec::new(),
        }))
    }

    async fn ping(&self) -> WalletResult<()> {
        Ok(())
    }
}

pub struct InMemoryUnitOfWork {
    store: InMemoryWalletRepository,
    row_locks: Vec<(Uuid, OwnedMutexGuard<()>)>,
    staged_balances: HashMap<Uuid, BigDecimal>,
    staged_records: Vec<TransactionRecord>,
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    async fn lock_wallet(&mut self, id: Uuid) -> WalletResult<Wallet> {
        if !self.row_locks.iter().any(|(locked, _)| *locked == id) {
            let row_lock = self
                .store
                .state()
                .row_locks
                .entry(id)
                .or_default()
                .clone();
            self.row_locks.push((id, row_lock.lock_owned().await));
        }

        let mut wallet = self.store.wallet(id).ok_or(WalletError::NotFound(id))?;
        if let Some(staged) = self.staged_balances.get(&id) {
            wallet.balance = staged.clone();
        }
        Ok(wallet)
    }

    async fn update_balance(&mut self, id: Uuid, new_balance: &BigDecimal) -> WalletResult<u64> {
        if self.store.has_fault(Fault::FailUpdate) {
            return Err(injected("update balance"));
        }
        if self.store.has_fault(Fault::UpdateMatchesNoRows) || self.store.wallet(id).is_none() {
            return Ok(0);
        }

        self.staged_balances.insert(id, new_balance.clone());
        Ok(1)
    }

    async fn insert_transaction(
        &mut self,
        wallet_id: Uuid,
        operation_type: OperationType,
        amount: &BigDecimal,
    ) -> WalletResult<Uuid> {
        if self.store.has_fault(Fault::FailInsert) {
            return Err(injected("insert transaction"));
        }

        let record = TransactionRecord::new(wallet_id, operation_type, amount.clone());
        let id = record.id;
        self.staged_records.push(record);
        Ok(id)
    }

    async fn commit(self: Box<Self>) -> WalletResult<()> {
        if self.store.has_fault(Fault::FailCommit) {
            return Err(injected("commit"));
        }
        let delay = self.store.state().commit_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let this = *self;
        let mut state = this.store.state();
        for (id, balance) in this.staged_balances {
            if let Some(wallet) = state.wallets.get_mut(&id) {
                wallet.balance = balance;
            }
        }
        state.transactions.extend(this.staged_records);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> WalletResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_uncommitted_unit_leaves_no_trace() {
        let repo = InMemoryWalletRepository::new();
        let wallet = repo.create_wallet(BigDecimal::from(100));

        {
            let mut unit = repo.begin().await.unwrap();
            unit.lock_wallet(wallet.id).await.unwrap();
            unit.update_balance(wallet.id, &BigDecimal::from(5)).await.unwrap();
            unit.insert_transaction(wallet.id, OperationType::Withdraw, &BigDecimal::from(95))
                .await
                .unwrap();
        }

        assert_eq!(repo.wallet(wallet.id).unwrap().balance, BigDecimal::from(100));
        assert_eq!(repo.transaction_count(), 0);
    }

    #[tokio::test]
    async fn test_commit_applies_balance_and_record_together() {
        let repo = InMemoryWalletRepository::new();
        let wallet = repo.create_wallet(BigDecimal::from(100));

        let mut unit = repo.begin().await.unwrap();
        unit.update_balance(wallet.id, &BigDecimal::from(150)).await.unwrap();
        let record_id = unit
            .insert_transaction(wallet.id, OperationType::Deposit, &BigDecimal::from(50))
            .await
            .unwrap();
        unit.commit().await.unwrap();

        assert_eq!(repo.wallet(wallet.id).unwrap().balance, BigDecimal::from(150));
        let records = repo.transactions_for(wallet.id);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, record_id);
    }

    #[tokio::test]
    async fn test_row_lock_blocks_second_unit_until_first_ends() {
        let repo = InMemoryWalletRepository::new();
        let wallet = repo.create_wallet(BigDecimal::from(1));

        let mut first = repo.begin().await.unwrap();
        first.lock_wallet(wallet.id).await.unwrap();

        let mut second = repo.begin().await.unwrap();
        let blocked = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            second.lock_wallet(wallet.id),
        )
        .await;
        assert!(blocked.is_err());

        first.rollback().await.unwrap();
        assert!(second.lock_wallet(wallet.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_of_missing_wallet_affects_no_rows() {
        let repo = InMemoryWalletRepository::new();
        let mut unit = repo.begin().await.unwrap();

        let rows = unit
            .update_balance(Uuid::new_v4(), &BigDecimal::from(1))
            .await
            .unwrap();
        assert_eq!(rows, 0);
    }
}

use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use uuid::Uuid;

use crate::domain::{Wallet, WalletOperation};
use crate::ports::{UnitOfWork, WalletError, WalletRepository, WalletResult};
use crate::services::balance_guard::BalanceGuard;

/// Executes deposits and withdrawals as all-or-nothing operations.
///
/// Mutations on one wallet are serialized by the [`BalanceGuard`] and, inside
/// the store, by a row lock taken when the wallet is read. Waiting for the
/// guard and the staged store steps are bounded by `operation_timeout`; on
/// expiry the lease and the open unit of work are dropped, which releases the
/// wallet and rolls the unit back. The commit itself runs outside the deadline,
/// so `DeadlineExceeded` always means nothing was written.
pub struct WalletService {
    repository: Arc<dyn WalletRepository>,
    guard: BalanceGuard,
    operation_timeout: Duration,
}

impl WalletService {
    pub fn new(repository: Arc<dyn WalletRepository>, operation_timeout: Duration) -> Self {
        Self {
            repository,
            guard: BalanceGuard::new(),
            operation_timeout,
        }
    }

    pub fn repository(&self) -> &Arc<dyn WalletRepository> {
        &self.repository
    }

    /// Applies `op` and returns the id of the ledger row it produced.
    pub async fn wallet_transaction(&self, op: &WalletOperation) -> WalletResult<Uuid> {
        let staged = timeout(self.operation_timeout, async {
            let lease = self.guard.acquire(op.wallet_id).await;
            let mut unit = self.repository.begin().await?;
            let outcome = apply(unit.as_mut(), op).await;
            Ok::<_, WalletError>((lease, unit, outcome))
        })
        .await;

        let (_lease, unit, outcome) = match staged {
            Ok(staged) => staged?,
            Err(_) => {
                tracing::warn!(
                    wallet_id = %op.wallet_id,
                    operation = %op.operation_type,
                    "Wallet operation exceeded its deadline"
                );
                return Err(WalletError::DeadlineExceeded);
            }
        };

        match outcome {
            Ok(transaction_id) => {
                unit.commit().await?;
                tracing::info!(
                    wallet_id = %op.wallet_id,
                    transaction_id = %transaction_id,
                    operation = %op.operation_type,
                    amount = %op.amount,
                    "Wallet transaction committed"
                );
                Ok(transaction_id)
            }
            Err(e) => {
                if let Err(rollback_err) = unit.rollback().await {
                    tracing::error!("Rollback failed after {}: {}", e, rollback_err);
                }
                if e.is_business() {
                    tracing::info!(wallet_id = %op.wallet_id, "Wallet transaction rejected: {}", e);
                } else {
                    tracing::error!(wallet_id = %op.wallet_id, "Transaction rolled back due to error: {}", e);
                }
                Err(e)
            }
        }
    }

    /// Plain read; does not take the balance guard.
    pub async fn get_wallet_balance(&self, wallet_id: Uuid) -> WalletResult<Wallet> {
        timeout(self.operation_timeout, self.repository.get_wallet(wallet_id))
            .await
            .map_err(|_| WalletError::DeadlineExceeded)?
    }
}

/// Read-check-write steps of one operation. Any error leaves `unit` uncommitted.
async fn apply(unit: &mut dyn UnitOfWork, op: &WalletOperation) -> WalletResult<Uuid> {
    let wallet = unit.lock_wallet(op.wallet_id).await?;
    let new_balance = op.operation_type.apply(&wallet.balance, &op.amount)?;

    let rows = unit.update_balance(op.wallet_id, &new_balance).await?;
    if rows == 0 {
        tracing::error!("No rows updated for wallet with UUID {}", op.wallet_id);
        return Err(WalletError::NotFound(op.wallet_id));
    }

    unit.insert_transaction(op.wallet_id, op.operation_type, &op.amount)
        .await
}

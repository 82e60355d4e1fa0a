//! Postgres implementation of WalletRepository.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use sqlx::{PgPool, Postgres, Transaction as SqlxTransaction};
use uuid::Uuid;

use crate::db::{models::WalletRow, queries};
use crate::domain::{OperationType, Wallet};
use crate::ports::{UnitOfWork, WalletError, WalletRepository, WalletResult};

/// Postgres-backed wallet repository.
#[derive(Clone)]
pub struct PostgresWalletRepository {
    pool: PgPool,
}

impl PostgresWalletRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Out-of-band provisioning; not reachable from the HTTP surface.
    pub async fn create_wallet(&self, balance: BigDecimal) -> WalletResult<Wallet> {
        let wallet = Wallet::new(balance);
        let row = queries::insert_wallet(&self.pool, &wallet).await.map_err(|e| {
            tracing::error!("Failed to create wallet {}: {}", wallet.id, e);
            WalletError::from(e)
        })?;

        Ok(row.into_domain())
    }
}

#[async_trait]
impl WalletRepository for PostgresWalletRepository {
    async fn get_wallet(&self, id: Uuid) -> WalletResult<Wallet> {
        let row = queries::get_wallet(&self.pool, id).await.map_err(|e| {
            tracing::error!("Error executing query for get_wallet with UUID {}: {}", id, e);
            WalletError::from(e)
        })?;

        row.map(WalletRow::into_domain)
            .ok_or(WalletError::NotFound(id))
    }

    async fn begin(&self) -> WalletResult<Box<dyn UnitOfWork>> {
        let tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {}", e);
            WalletError::from(e)
        })?;

        Ok(Box::new(PostgresUnitOfWork { tx }))
    }

    async fn ping(&self) -> WalletResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Wraps an open sqlx transaction. Dropping it uncommitted rolls back.
pub struct PostgresUnitOfWork {
    tx: SqlxTransaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PostgresUnitOfWork {
    async fn lock_wallet(&mut self, id: Uuid) -> WalletResult<Wallet> {
        let row = queries::lock_wallet(&mut self.tx, id).await.map_err(|e| {
            tracing::error!("Error locking wallet with UUID {}: {}", id, e);
            WalletError::from(e)
        })?;

        row.map(WalletRow::into_domain)
            .ok_or(WalletError::NotFound(id))
    }

    async fn update_balance(&mut self, id: Uuid, new_balance: &BigDecimal) -> WalletResult<u64> {
        queries::update_wallet_balance(&mut self.tx, id, new_balance)
            .await
            .map_err(|e| {
                tracing::error!("Error executing update query for wallet with UUID {}: {}", id, e);
                WalletError::from(e)
            })
    }

    async fn insert_transaction(
        &mut self,
        wallet_id: Uuid,
        operation_type: OperationType,
        amount: &BigDecimal,
    ) -> WalletResult<Uuid> {
        queries::insert_transaction(&mut self.tx, wallet_id, operation_type, amount)
            .await
            .map_err(|e| {
                tracing::error!("Error saving transaction for wallet {}: {}", wallet_id, e);
                WalletError::from(e)
            })
    }

    async fn commit(self: Box<Self>) -> WalletResult<()> {
        let Self { tx } = *self;
        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit transaction: {}", e);
            WalletError::from(e)
        })
    }

    async fn rollback(self: Box<Self>) -> WalletResult<()> {
        let Self { tx } = *self;
        tx.rollback().await.map_err(|e| {
            tracing::error!("Failed to roll back transaction: {}", e);
            WalletError::from(e)
        })
    }
}

//! Storage ports the wallet service depends on.
//! Adapters in `crate::adapters` provide the PostgreSQL and in-memory implementations.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{OperationType, Wallet};

/// Outcome of a failed wallet operation.
///
/// Business outcomes (`NotFound`, `InsufficientFunds`) are built where they are
/// detected so callers can tell them apart from store failures.
#[derive(Error, Debug)]
pub enum WalletError {
    #[error("wallet {0} not found")]
    NotFound(Uuid),

    #[error("insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds {
        balance: BigDecimal,
        requested: BigDecimal,
    },

    #[error("operation deadline exceeded")]
    DeadlineExceeded,

    #[error("store failure: {0}")]
    Store(#[from] sqlx::Error),
}

impl WalletError {
    /// Expected business outcome rather than an infrastructure problem.
    pub fn is_business(&self) -> bool {
        matches!(
            self,
            WalletError::NotFound(_) | WalletError::InsufficientFunds { .. }
        )
    }
}

pub type WalletResult<T> = Result<T, WalletError>;

/// Read access to wallets plus the entry point for atomic writes.
#[async_trait]
pub trait WalletRepository: Send + Sync {
    /// Plain read, no locks taken.
    async fn get_wallet(&self, id: Uuid) -> WalletResult<Wallet>;

    /// Opens a unit of work. Dropping it without `commit` rolls it back.
    async fn begin(&self) -> WalletResult<Box<dyn UnitOfWork>>;

    /// Connectivity probe used by the health endpoint.
    async fn ping(&self) -> WalletResult<()>;
}

/// One atomic update-balance + append-record sequence against the store.
#[async_trait]
pub trait UnitOfWork: Send {
    /// Reads the wallet and holds a row lock on it until the unit ends.
    async fn lock_wallet(&mut self, id: Uuid) -> WalletResult<Wallet>;

    /// Returns the number of rows affected.
    async fn update_balance(&mut self, id: Uuid, new_balance: &BigDecimal) -> WalletResult<u64>;

    /// Appends the ledger row and returns its generated id.
    async fn insert_transaction(
        &mut self,
        wallet_id: Uuid,
        operation_type: OperationType,
        amount: &BigDecimal,
    ) -> WalletResult<Uuid>;

    async fn commit(self: Box<Self>) -> WalletResult<()>;

    async fn rollback(self: Box<Self>) -> WalletResult<()>;
}

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::{OperationType, TransactionRecord, Wallet};

#[derive(Debug, FromRow)]
pub struct WalletRow {
    pub uuid: Uuid,
    pub balance: BigDecimal,
    pub created_at: DateTime<Utc>,
}

impl WalletRow {
    pub fn into_domain(self) -> Wallet {
        Wallet {
            id: self.uuid,
            balance: self.balance,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct TransactionRow {
    pub uuid: Uuid,
    pub wallet_uuid: Uuid,
    pub transaction_type: String,
    pub amount: BigDecimal,
    pub created_at: DateTime<Utc>,
}

impl TransactionRow {
    /// Fails only if the row carries a type the CHECK constraint should have rejected.
    pub fn into_domain(self) -> Result<TransactionRecord, sqlx::Error> {
        let operation_type = self
            .transaction_type
            .parse::<OperationType>()
            .map_err(|e| sqlx::Error::Decode(e.into()))?;

        Ok(TransactionRecord {
            id: self.uuid,
            wallet_id: self.wallet_uuid,
            operation_type,
            amount: self.amount,
            created_at: self.created_at,
        })
    }
}

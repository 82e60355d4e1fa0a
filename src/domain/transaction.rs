//! Transaction record domain entity.
//! One record is appended per committed balance mutation and never changes afterwards.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::OperationType;

/// Immutable ledger entry describing one committed balance mutation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRecord {
    pub id: Uuid,
    pub wallet_id: Uuid,
    pub operation_type: OperationType,
    pub amount: BigDecimal,
    pub created_at: DateTime<Utc>,
}

impl TransactionRecord {
    pub fn new(wallet_id: Uuid, operation_type: OperationType, amount: BigDecimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            wallet_id,
            operation_type,
            amount,
            created_at: Utc::now(),
        }
    }
}

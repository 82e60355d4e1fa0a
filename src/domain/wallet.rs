//! Wallet domain entity and the balance arithmetic applied to it.
//! Framework-agnostic: the store adapters and the HTTP layer both map into these types.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::ports::WalletError;

/// A balance-holding account identified by UUID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Wallet {
    #[serde(rename = "uuid")]
    pub id: Uuid,
    #[schema(value_type = String, example = "100.00")]
    pub balance: BigDecimal,
    pub created_at: DateTime<Utc>,
}

impl Wallet {
    pub fn new(balance: BigDecimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            balance,
            created_at: Utc::now(),
        }
    }
}

/// Kind of balance mutation. Stored as text in `transactions.transaction_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationType {
    Deposit,
    Withdraw,
}

impl OperationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Deposit => "DEPOSIT",
            OperationType::Withdraw => "WITHDRAW",
        }
    }

    /// Computes the balance after applying `amount`.
    ///
    /// A withdraw larger than the current balance fails with
    /// [`WalletError::InsufficientFunds`] and leaves nothing to write.
    pub fn apply(&self, balance: &BigDecimal, amount: &BigDecimal) -> Result<BigDecimal, WalletError> {
        match self {
            OperationType::Deposit => Ok(balance + amount),
            OperationType::Withdraw => {
                if balance < amount {
                    return Err(WalletError::InsufficientFunds {
                        balance: balance.clone(),
                        requested: amount.clone(),
                    });
                }
                Ok(balance - amount)
            }
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DEPOSIT" => Ok(OperationType::Deposit),
            "WITHDRAW" => Ok(OperationType::Withdraw),
            other => Err(format!("unknown operation type: {}", other)),
        }
    }
}

/// A single deposit or withdraw request against one wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WalletOperation {
    pub wallet_id: Uuid,
    pub operation_type: OperationType,
    #[schema(value_type = String, example = "1000.00")]
    #[serde(deserialize_with = "deserialize_amount")]
    pub amount: BigDecimal,
}

impl WalletOperation {
    pub fn new(wallet_id: Uuid, operation_type: OperationType, amount: BigDecimal) -> Self {
        Self {
            wallet_id,
            operation_type,
            amount,
        }
    }

    pub fn deposit(wallet_id: Uuid, amount: BigDecimal) -> Self {
        Self::new(wallet_id, OperationType::Deposit, amount)
    }

    pub fn withdraw(wallet_id: Uuid, amount: BigDecimal) -> Self {
        Self::new(wallet_id, OperationType::Withdraw, amount)
    }
}

/// Longest amount literal accepted from the wire. Checked before parsing.
pub const AMOUNT_TEXT_MAX_LEN: usize = 64;

/// Parses an amount literal such as `"1000.00"` or `"1e3"` exactly.
pub fn parse_amount(text: &str) -> Result<BigDecimal, String> {
    if text.len() > AMOUNT_TEXT_MAX_LEN {
        return Err(format!(
            "amount must be at most {} characters",
            AMOUNT_TEXT_MAX_LEN
        ));
    }
    BigDecimal::from_str(text).map_err(|e| format!("invalid amount {:?}: {}", text, e))
}

/// Reads an amount from a JSON string or a JSON number without going through `f64`.
pub fn deserialize_amount<'de, D>(deserializer: D) -> Result<BigDecimal, D::Error>
where
    D: Deserializer<'de>,
{
    match amount_from_json(Value::deserialize(deserializer)?) {
        Ok(Some(amount)) => Ok(amount),
        Ok(None) => Err(de::Error::custom("amount must not be null")),
        Err(message) => Err(de::Error::custom(message)),
    }
}

/// Like [`deserialize_amount`], mapping `null` to `None`.
pub fn deserialize_optional_amount<'de, D>(deserializer: D) -> Result<Option<BigDecimal>, D::Error>
where
    D: Deserializer<'de>,
{
    amount_from_json(Value::deserialize(deserializer)?).map_err(de::Error::custom)
}

fn amount_from_json(value: Value) -> Result<Option<BigDecimal>, String> {
    let text = match value {
        Value::Null => return Ok(None),
        Value::String(text) => text,
        // Keeps the literal digits: serde_json is built with `arbitrary_precision`.
        Value::Number(number) => number.to_string(),
        other => return Err(format!("invalid type: {}, expected a decimal amount", other)),
    };
    parse_amount(&text).map(Some)
}

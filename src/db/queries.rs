use bigdecimal::BigDecimal;
use sqlx::{PgPool, Postgres, Result, Transaction as SqlxTransaction};
use uuid::Uuid;

use crate::db::models::{TransactionRow, WalletRow};
use crate::domain::{OperationType, Wallet};

// --- Wallet Queries ---

pub async fn get_wallet(pool: &PgPool, id: Uuid) -> Result<Option<WalletRow>> {
    sqlx::query_as::<_, WalletRow>("SELECT uuid, balance, created_at FROM wallets WHERE uuid = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Reads the wallet and row-locks it for the rest of the transaction.
pub async fn lock_wallet(
    executor: &mut SqlxTransaction<'_, Postgres>,
    id: Uuid,
) -> Result<Option<WalletRow>> {
    sqlx::query_as::<_, WalletRow>(
        "SELECT uuid, balance, created_at FROM wallets WHERE uuid = $1 FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(&mut **executor)
    .await
}

pub async fn update_wallet_balance(
    executor: &mut SqlxTransaction<'_, Postgres>,
    id: Uuid,
    balance: &BigDecimal,
) -> Result<u64> {
    let result = sqlx::query("UPDATE wallets SET balance = $1 WHERE uuid = $2")
        .bind(balance)
        .bind(id)
        .execute(&mut **executor)
        .await?;

    Ok(result.rows_affected())
}

pub async fn insert_wallet(pool: &PgPool, wallet: &Wallet) -> Result<WalletRow> {
    sqlx::query_as::<_, WalletRow>(
        r#"
        INSERT INTO wallets (uuid, balance, created_at)
        VALUES ($1, $2, $3)
        RETURNING uuid, balance, created_at
        "#,
    )
    .bind(wallet.id)
    .bind(&wallet.balance)
    .bind(wallet.created_at)
    .fetch_one(pool)
    .await
}

// --- Transaction Queries ---

pub async fn insert_transaction(
    executor: &mut SqlxTransaction<'_, Postgres>,
    wallet_id: Uuid,
    operation_type: OperationType,
    amount: &BigDecimal,
) -> Result<Uuid> {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO transactions (wallet_uuid, transaction_type, amount)
        VALUES ($1, $2, $3)
        RETURNING uuid
        "#,
    )
    .bind(wallet_id)
    .bind(operation_type.as_str())
    .bind(amount)
    .fetch_one(&mut **executor)
    .await
}

pub async fn get_transaction(pool: &PgPool, id: Uuid) -> Result<Option<TransactionRow>> {
    sqlx::query_as::<_, TransactionRow>(
        "SELECT uuid, wallet_uuid, transaction_type, amount, created_at FROM transactions WHERE uuid = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn count_wallet_transactions(pool: &PgPool, wallet_id: Uuid) -> Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM transactions WHERE wallet_uuid = $1")
        .bind(wallet_id)
        .fetch_one(pool)
        .await
}

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use bigdecimal::BigDecimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::wallet::deserialize_optional_amount;
use crate::domain::{Wallet, WalletOperation};
use crate::error::AppError;
use crate::handlers::ApiResponse;
use crate::validation::{self, ValidationError};
use crate::AppState;

pub const MSG_TRANSACTION_SUCCESS: &str = "Transaction successful";
pub const MSG_WALLET_BALANCE_SUCCESS: &str = "Wallet balance successfully received";

/// Body of `POST /api/v1/wallet` as decoded from the wire.
///
/// A field that is present but unreadable (bad UUID or decimal text) fails
/// decoding. Missing fields and unknown operation types are left to
/// validation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletOperationRequest {
    pub wallet_id: Option<Uuid>,
    pub operation_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_amount")]
    pub amount: Option<BigDecimal>,
}

impl TryFrom<WalletOperationRequest> for WalletOperation {
    type Error = ValidationError;

    fn try_from(request: WalletOperationRequest) -> Result<Self, Self::Error> {
        let wallet_id = validation::require("walletId", request.wallet_id)?;
        let operation_type = validation::require("operationType", request.operation_type)?;
        let amount = validation::require("amount", request.amount)?;

        let op = WalletOperation::new(
            wallet_id,
            validation::parse_operation_type(&operation_type)?,
            amount,
        );
        validation::validate_wallet_operation(&op)?;
        Ok(op)
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/wallet",
    request_body = WalletOperation,
    responses(
        (status = 200, description = "Transaction successful"),
        (status = 400, description = "Invalid request body or data"),
        (status = 404, description = "Wallet not found"),
        (status = 422, description = "Insufficient funds"),
        (status = 504, description = "Request deadline exceeded"),
        (status = 500, description = "Internal Server Error")
    ),
    tag = "Wallet"
)]
pub async fn wallet_operation(
    State(state): State<AppState>,
    payload: Result<Json<WalletOperationRequest>, JsonRejection>,
) -> Result<ApiResponse<()>, AppError> {
    let Json(request) =
        payload.map_err(|rejection| AppError::InvalidRequestBody(rejection.body_text()))?;
    let op = WalletOperation::try_from(request)?;

    state.wallet_service.wallet_transaction(&op).await?;

    Ok(ApiResponse::message(StatusCode::OK, MSG_TRANSACTION_SUCCESS))
}

#[utoipa::path(
    get,
    path = "/api/v1/wallets/{wallet_uuid}",
    params(("wallet_uuid" = String, Path, description = "Wallet UUID")),
    responses(
        (status = 200, description = "Wallet balance successfully received", body = Wallet),
        (status = 400, description = "Invalid wallet UUID format"),
        (status = 404, description = "Wallet not found"),
        (status = 500, description = "Internal Server Error")
    ),
    tag = "Wallet"
)]
pub async fn get_wallet(
    State(state): State<AppState>,
    Path(wallet_uuid): Path<String>,
) -> Result<ApiResponse<Wallet>, AppError> {
    let wallet_id = validation::parse_wallet_id(&wallet_uuid)
        .map_err(|e| AppError::InvalidWalletId(e.to_string()))?;

    let wallet = state.wallet_service.get_wallet_balance(wallet_id).await?;

    Ok(ApiResponse::new(
        StatusCode::OK,
        MSG_WALLET_BALANCE_SUCCESS,
        Some(wallet),
    ))
}

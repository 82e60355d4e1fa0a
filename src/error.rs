use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use uuid::Uuid;

use crate::handlers::ApiResponse;
use crate::ports::WalletError;
use crate::validation::ValidationError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid request body")]
    InvalidRequestBody(String),

    #[error("Invalid request data. Please check the input parameters.")]
    Validation(#[from] ValidationError),

    #[error("Invalid wallet UUID format.")]
    InvalidWalletId(String),

    #[error("Wallet with UUID {0} not found")]
    WalletNotFound(Uuid),

    #[error("insufficient funds")]
    InsufficientFunds,

    #[error("Request deadline exceeded")]
    DeadlineExceeded,

    #[error("Internal Server Error")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidWalletId(_) => StatusCode::BAD_REQUEST,
            AppError::WalletNotFound(_) => StatusCode::NOT_FOUND,
            AppError::InsufficientFunds => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<WalletError> for AppError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::NotFound(id) => AppError::WalletNotFound(id),
            WalletError::InsufficientFunds { .. } => AppError::InsufficientFunds,
            WalletError::DeadlineExceeded => AppError::DeadlineExceeded,
            WalletError::Store(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            AppError::Internal(detail) => tracing::error!("Internal error: {}", detail),
            AppError::InvalidRequestBody(detail) | AppError::InvalidWalletId(detail) => {
                tracing::debug!("Rejected request: {}", detail)
            }
            AppError::Validation(e) => tracing::debug!("Rejected request: {}", e),
            _ => {}
        }

        ApiResponse::<()>::message(status, self.to_string()).into_response()
    }
}

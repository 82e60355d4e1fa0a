use bigdecimal::BigDecimal;
use std::fmt;
use uuid::Uuid;

use crate::domain::{OperationType, WalletOperation};

pub const AMOUNT_MAX_INTEGER_DIGITS: i64 = 32;
pub const AMOUNT_MAX_SCALE: i64 = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), ValidationError>;

pub fn validate_wallet_id(wallet_id: &Uuid) -> ValidationResult {
    if wallet_id.is_nil() {
        return Err(ValidationError::new("walletId", "must not be the nil UUID"));
    }

    Ok(())
}

/// Bounds are read from the unscaled digits and the exponent. Formatting or
/// rescaling a literal like `1e9000000000000000` would materialize every digit.
pub fn validate_amount(amount: &BigDecimal) -> ValidationResult {
    let (_, scale) = amount.as_bigint_and_exponent();
    if scale > AMOUNT_MAX_SCALE {
        return Err(ValidationError::new(
            "amount",
            format!("must have at most {} decimal places", AMOUNT_MAX_SCALE),
        ));
    }

    let integer_digits = i64::try_from(amount.digits())
        .unwrap_or(i64::MAX)
        .saturating_sub(scale);
    if integer_digits > AMOUNT_MAX_INTEGER_DIGITS {
        return Err(ValidationError::new(
            "amount",
            format!("must have at most {} integer digits", AMOUNT_MAX_INTEGER_DIGITS),
        ));
    }

    if amount <= &BigDecimal::from(0) {
        return Err(ValidationError::new("amount", "must be greater than zero"));
    }

    Ok(())
}

pub fn parse_operation_type(raw: &str) -> Result<OperationType, ValidationError> {
    raw.parse()
        .map_err(|_| ValidationError::new("operationType", "must be DEPOSIT or WITHDRAW"))
}

pub fn require<T>(field: &'static str, value: Option<T>) -> Result<T, ValidationError> {
    value.ok_or_else(|| ValidationError::new(field, "is required"))
}

/// Operation type needs no check here: deserialization only admits DEPOSIT and WITHDRAW.
pub fn validate_wallet_operation(op: &WalletOperation) -> ValidationResult {
    validate_wallet_id(&op.wallet_id)?;
    validate_amount(&op.amount)?;
    Ok(())
}

pub fn parse_wallet_id(raw: &str) -> Result<Uuid, ValidationError> {
    let wallet_id = Uuid::parse_str(raw.trim())
        .map_err(|_| ValidationError::new("walletId", "must be a valid UUID"))?;
    validate_wallet_id(&wallet_id)?;
    Ok(wallet_id)
}

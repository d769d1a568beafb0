//! Transfer error types

use crate::store::StoreError;
use thiserror::Error;

/// Failures of the transfer unit of work.
///
/// Every variant except the validation errors implies a full rollback; no
/// partial writes are ever visible. `TransactionFailed` is the only
/// retryable class, and retry policy belongs to the caller.
#[derive(Debug, Error)]
pub enum TransferError {
    // === Validation errors: rejected before any write ===
    #[error("amount must be greater than zero")]
    InvalidAmount,

    #[error("source and destination accounts are the same")]
    SameAccount,

    // === Rejected inside the transactional scope ===
    #[error("account not found: {0}")]
    AccountNotFound(i64),

    #[error("insufficient balance on account {account_id}: available {available}, requested {requested}")]
    InsufficientBalance {
        account_id: i64,
        available: i64,
        requested: i64,
    },

    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    // === Store-level failure: retryable server fault ===
    #[error("transaction failed: {0}")]
    TransactionFailed(String),
}

impl TransferError {
    /// Whether the caller may retry the same request
    pub fn is_retryable(&self) -> bool {
        matches!(self, TransferError::TransactionFailed(_))
    }
}

impl From<StoreError> for TransferError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::AccountNotFound(id) => TransferError::AccountNotFound(id),
            StoreError::Constraint(msg) => TransferError::ConstraintViolation(msg),
            StoreError::Database(e) => TransferError::TransactionFailed(e.to_string()),
        }
    }
}

//! Ledger error types.
//!
//! This module defines all errors that can occur during ledger operations:
//! input errors rejected before any lock is taken, state errors that are
//! expected business-rule outcomes, integrity violations, and retryable
//! infrastructure errors.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Input Errors ==========
    /// Amount must be strictly positive.
    #[error("Amount must be positive, got {0}")]
    InvalidAmount(Decimal),

    /// Unknown transaction category tag.
    #[error("Unknown category: {0}")]
    InvalidCategory(String),

    /// Unknown reference kind tag.
    #[error("Unknown reference kind: {0}")]
    InvalidReferenceKind(String),

    // ========== State Errors ==========
    /// Cashbox is deactivated and rejects writes.
    #[error("Cashbox {0} is inactive")]
    InactiveCashbox(Uuid),

    /// The cashbox does not hold enough money for the operation.
    #[error("Insufficient balance: available {available}, required {required}")]
    InsufficientBalance {
        /// Balance available at the time of the check.
        available: Decimal,
        /// Amount the operation needed.
        required: Decimal,
    },

    /// The transaction has already been reversed.
    #[error("Transaction {0} has already been reversed")]
    AlreadyReversed(Uuid),

    /// A reversal transaction cannot itself be reversed.
    #[error("Transaction {0} is a reversal and cannot be reversed")]
    CannotReverseReversal(Uuid),

    // ========== Integrity Violations ==========
    /// An attempt was made to modify or delete a persisted transaction.
    #[error("Ledger transactions are append-only and cannot be modified or deleted")]
    Immutable,

    // ========== Not Found ==========
    /// Cashbox not found.
    #[error("Cashbox not found: {0}")]
    CashboxNotFound(Uuid),

    /// Transaction not found.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(Uuid),

    // ========== Infrastructure Errors ==========
    /// The per-cashbox lock could not be obtained within the configured bound.
    #[error("Timed out waiting for the lock on cashbox {0}, please retry")]
    LockTimeout(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::InvalidCategory(_) => "INVALID_CATEGORY",
            Self::InvalidReferenceKind(_) => "INVALID_REFERENCE_KIND",
            Self::InactiveCashbox(_) => "INACTIVE_CASHBOX",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::AlreadyReversed(_) => "ALREADY_REVERSED",
            Self::CannotReverseReversal(_) => "CANNOT_REVERSE_REVERSAL",
            Self::Immutable => "IMMUTABLE_TRANSACTION",
            Self::CashboxNotFound(_) => "CASHBOX_NOT_FOUND",
            Self::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            Self::LockTimeout(_) => "LOCK_TIMEOUT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - input errors, rejected before any lock
            Self::InvalidAmount(_) | Self::InvalidCategory(_) | Self::InvalidReferenceKind(_) => {
                400
            }

            // 404 Not Found
            Self::CashboxNotFound(_) | Self::TransactionNotFound(_) => 404,

            // 409 Conflict - attempts to falsify the audit trail
            Self::Immutable => 409,

            // 422 Unprocessable - expected business-rule outcomes
            Self::InactiveCashbox(_)
            | Self::InsufficientBalance { .. }
            | Self::AlreadyReversed(_)
            | Self::CannotReverseReversal(_) => 422,

            // 503 Service Unavailable - retry with backoff
            Self::LockTimeout(_) => 503,

            // 500 Internal Server Error
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns true if the caller may retry the operation with backoff.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::LockTimeout(_) | Self::Database(_))
    }
}

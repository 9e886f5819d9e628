//! Ledger store errors.

use chrono::NaiveDate;
use tally_shared::AppError;
use tally_shared::types::{AccountId, CompanyId, TransactionId};
use thiserror::Error;

use super::transaction::TransactionStatus;
use crate::account::AccountError;
use crate::error::ErrorKind;

/// Errors raised by a ledger store.
#[derive(Debug, Error)]
pub enum LedgerStoreError {
    /// Company not found.
    #[error("Company not found: {0}")]
    CompanyNotFound(CompanyId),

    /// A line references an account outside the company's chart.
    #[error("Account {account} not found in company {company}")]
    AccountNotFound {
        /// Company searched.
        company: CompanyId,
        /// Missing account.
        account: AccountId,
    },

    /// Transaction not found.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    /// End date before start date.
    #[error("Invalid date range: end {end} is before start {start}")]
    InvalidPeriod {
        /// Requested start.
        start: NaiveDate,
        /// Requested end.
        end: NaiveDate,
    },

    /// Transaction recorded without lines.
    #[error("Transaction must have at least one line")]
    EmptyTransaction,

    /// Status change not allowed from the current status.
    #[error("Transaction {id} cannot move from {from} to {to}")]
    InvalidTransition {
        /// Transaction id.
        id: TransactionId,
        /// Current status.
        from: TransactionStatus,
        /// Requested status.
        to: TransactionStatus,
    },

    /// Account write rule violated.
    #[error(transparent)]
    Account(#[from] AccountError),

    /// Failure in the backing store.
    #[error("Storage error: {0}")]
    Backend(String),
}

impl LedgerStoreError {
    /// Returns the taxonomy kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::CompanyNotFound(_) | Self::AccountNotFound { .. } | Self::TransactionNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::InvalidPeriod { .. } | Self::EmptyTransaction => ErrorKind::InvalidArgument,
            Self::InvalidTransition { .. } => ErrorKind::Conflict,
            Self::Account(err) => err.kind(),
            Self::Backend(_) => ErrorKind::Storage,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::CompanyNotFound(_) => "COMPANY_NOT_FOUND",
            Self::AccountNotFound { .. } => "ACCOUNT_NOT_FOUND",
            Self::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            Self::InvalidPeriod { .. } => "INVALID_DATE_RANGE",
            Self::EmptyTransaction => "EMPTY_TRANSACTION",
            Self::InvalidTransition { .. } => "INVALID_STATUS_TRANSITION",
            Self::Account(err) => err.error_code(),
            Self::Backend(_) => "STORAGE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        self.kind().http_status_code()
    }
}

impl From<LedgerStoreError> for AppError {
    fn from(err: LedgerStoreError) -> Self {
        match err {
            LedgerStoreError::Account(inner) => inner.into(),
            other => {
                let message = other.to_string();
                match other.kind() {
                    ErrorKind::NotFound => Self::NotFound(message),
                    ErrorKind::Forbidden => Self::Forbidden(message),
                    ErrorKind::InvalidArgument => Self::InvalidArgument(message),
                    ErrorKind::Conflict => Self::Conflict(message),
                    ErrorKind::Inconsistent => Self::Inconsistent(message),
                    ErrorKind::Storage => Self::Database(message),
                }
            }
        }
    }
}

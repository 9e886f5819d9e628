//! Report error types.

use chrono::NaiveDate;
use tally_shared::AppError;
use tally_shared::types::{AccountId, CompanyId, LedgerLineId};
use thiserror::Error;

use crate::error::ErrorKind;
use crate::ledger::LedgerStoreError;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// End date before start date.
    #[error("Invalid date range: end {end} is before start {start}")]
    InvalidDateRange {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },

    /// Unknown trend interval.
    #[error("Unsupported interval: {0}")]
    UnsupportedInterval(String),

    /// Unknown trend kind.
    #[error("Unsupported trend kind: {0}")]
    UnsupportedTrendKind(String),

    /// Company not found.
    #[error("Company not found: {0}")]
    CompanyNotFound(CompanyId),

    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// A posted line references an account missing from the chart.
    #[error("Ledger line {line} references unknown account {account}")]
    Inconsistent {
        /// Offending line.
        line: LedgerLineId,
        /// Missing account.
        account: AccountId,
    },

    /// The ledger store failed.
    #[error(transparent)]
    Store(LedgerStoreError),
}

impl ReportError {
    /// Returns the taxonomy kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidDateRange { .. }
            | Self::UnsupportedInterval(_)
            | Self::UnsupportedTrendKind(_) => ErrorKind::InvalidArgument,
            Self::CompanyNotFound(_) | Self::AccountNotFound(_) => ErrorKind::NotFound,
            Self::Inconsistent { .. } => ErrorKind::Inconsistent,
            Self::Store(err) => err.kind(),
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::UnsupportedInterval(_) => "UNSUPPORTED_INTERVAL",
            Self::UnsupportedTrendKind(_) => "UNSUPPORTED_TREND_KIND",
            Self::CompanyNotFound(_) => "COMPANY_NOT_FOUND",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::Inconsistent { .. } => "LEDGER_INCONSISTENT",
            Self::Store(err) => err.error_code(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        self.kind().http_status_code()
    }
}

impl From<LedgerStoreError> for ReportError {
    fn from(err: LedgerStoreError) -> Self {
        match err {
            LedgerStoreError::CompanyNotFound(id) => Self::CompanyNotFound(id),
            LedgerStoreError::AccountNotFound { account, .. } => Self::AccountNotFound(account),
            LedgerStoreError::InvalidPeriod { start, end } => Self::InvalidDateRange { start, end },
            other => Self::Store(other),
        }
    }
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::Store(inner) => inner.into(),
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

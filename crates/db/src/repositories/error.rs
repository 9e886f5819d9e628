//! Repository error type.

use sea_orm::DbErr;
use tally_core::ErrorKind;
use tally_core::account::AccountError;
use tally_core::ledger::LedgerStoreError;
use tally_shared::AppError;
use thiserror::Error;

/// Errors raised by the ledger and account repositories.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Account write rule violated.
    #[error(transparent)]
    Account(#[from] AccountError),

    /// Ledger store rule violated or stored data unreadable.
    #[error(transparent)]
    Store(#[from] LedgerStoreError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl RepositoryError {
    /// Returns the taxonomy kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Account(err) => err.kind(),
            Self::Store(err) => err.kind(),
            Self::Database(_) => ErrorKind::Storage,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Account(err) => err.error_code(),
            Self::Store(err) => err.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        self.kind().http_status_code()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Account(err) => err.into(),
            RepositoryError::Store(err) => err.into(),
            RepositoryError::Database(err) => Self::Database(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_shared::types::{AccountId, CompanyId};

    #[test]
    fn test_kinds_delegate() {
        let err: RepositoryError = AccountError::DuplicateCode("1000".into()).into();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.error_code(), "DUPLICATE_ACCOUNT_CODE");

        let err: RepositoryError = LedgerStoreError::CompanyNotFound(CompanyId::new()).into();
        assert_eq!(err.http_status_code(), 404);

        let err: RepositoryError = DbErr::Custom("connection reset".into()).into();
        assert_eq!(err.kind(), ErrorKind::Storage);
        assert_eq!(err.http_status_code(), 500);
    }

    #[test]
    fn test_into_app_error() {
        let app: AppError = RepositoryError::from(AccountError::SystemAccountImmutable(
            AccountId::new(),
        ))
        .into();
        assert_eq!(app.error_code(), "FORBIDDEN");

        let app: AppError = RepositoryError::from(DbErr::Custom("boom".into())).into();
        assert_eq!(app.error_code(), "DATABASE_ERROR");
    }
}

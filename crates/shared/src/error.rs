//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
///
/// Every domain error in the workspace converts into one of these kinds.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing company, account, or other context.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Mutation of a protected resource.
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Malformed input (date range, interval, account fields).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Conflict (e.g., duplicate account code).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Stored data violates a ledger invariant.
    #[error("Inconsistent data: {0}")]
    Inconsistent(String),

    /// Database or storage collaborator error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Forbidden(_) => 403,
            Self::InvalidArgument(_) => 400,
            Self::Conflict(_) => 409,
            Self::Inconsistent(_) | Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::Conflict(_) => "CONFLICT",
            Self::Inconsistent(_) => "DATA_INCONSISTENT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(AppError::NotFound(String::new()).status_code(), 404);
        assert_eq!(AppError::Forbidden(String::new()).status_code(), 403);
        assert_eq!(AppError::InvalidArgument(String::new()).status_code(), 400);
        assert_eq!(AppError::Conflict(String::new()).status_code(), 409);
        assert_eq!(AppError::Inconsistent(String::new()).status_code(), 500);
        assert_eq!(AppError::Database(String::new()).status_code(), 500);
        assert_eq!(AppError::Internal(String::new()).status_code(), 500);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::NotFound(String::new()).error_code(), "NOT_FOUND");
        assert_eq!(AppError::Forbidden(String::new()).error_code(), "FORBIDDEN");
        assert_eq!(
            AppError::InvalidArgument(String::new()).error_code(),
            "INVALID_ARGUMENT"
        );
        assert_eq!(AppError::Conflict(String::new()).error_code(), "CONFLICT");
        assert_eq!(
            AppError::Inconsistent(String::new()).error_code(),
            "DATA_INCONSISTENT"
        );
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::NotFound("company".into()).to_string(),
            "Not found: company"
        );
        assert_eq!(
            AppError::Forbidden("system account".into()).to_string(),
            "Access denied: system account"
        );
        assert_eq!(
            AppError::InvalidArgument("end before start".into()).to_string(),
            "Invalid argument: end before start"
        );
        assert_eq!(
            AppError::Inconsistent("orphan line".into()).to_string(),
            "Inconsistent data: orphan line"
        );
    }
}

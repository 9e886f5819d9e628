//! Error taxonomy shared by every core module.

use serde::{Deserialize, Serialize};

/// Broad classification of a core error.
///
/// Module errors (`AccountError`, `LedgerStoreError`, `ReportError`) each map
/// onto one of these kinds so callers can branch without matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Missing company, account, or other context.
    NotFound,
    /// Mutation of a system account.
    Forbidden,
    /// Malformed input: bad date range, unsupported interval, invalid field.
    InvalidArgument,
    /// Uniqueness violation such as a duplicate account code.
    Conflict,
    /// Stored ledger data violates an invariant.
    Inconsistent,
    /// The persistence collaborator failed.
    Storage,
}

impl ErrorKind {
    /// Returns the HTTP status code conventionally used for this kind.
    #[must_use]
    pub const fn http_status_code(self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::Forbidden => 403,
            Self::InvalidArgument => 400,
            Self::Conflict => 409,
            Self::Inconsistent | Self::Storage => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_codes() {
        assert_eq!(ErrorKind::NotFound.http_status_code(), 404);
        assert_eq!(ErrorKind::Forbidden.http_status_code(), 403);
        assert_eq!(ErrorKind::InvalidArgument.http_status_code(), 400);
        assert_eq!(ErrorKind::Conflict.http_status_code(), 409);
        assert_eq!(ErrorKind::Inconsistent.http_status_code(), 500);
        assert_eq!(ErrorKind::Storage.http_status_code(), 500);
    }
}

//! Account write-path errors.

use tally_shared::AppError;
use tally_shared::types::{AccountId, CompanyId};
use thiserror::Error;

use super::types::AccountType;
use crate::error::ErrorKind;

/// Errors raised while creating, updating, or deleting accounts.
#[derive(Debug, Error)]
pub enum AccountError {
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Parent account not found in the company.
    #[error("Parent account not found: {0}")]
    ParentNotFound(AccountId),

    /// Company not found.
    #[error("Company not found: {0}")]
    CompanyNotFound(CompanyId),

    /// Account code already exists in the company.
    #[error("Account code '{0}' already exists")]
    DuplicateCode(String),

    /// A required text field is blank.
    #[error("Account {0} is required")]
    EmptyField(&'static str),

    /// Parent account has a different type.
    #[error("Parent account must be of the same type: expected {expected}, found {found}")]
    ParentTypeMismatch {
        /// The account's type.
        expected: AccountType,
        /// The parent's type.
        found: AccountType,
    },

    /// Type change would leave child accounts under a parent of another type.
    #[error("Cannot change type of account {account} while child account {child} is of type {child_type}")]
    ChildTypeMismatch {
        /// The account being updated.
        account: AccountId,
        /// A child whose type would no longer match.
        child: AccountId,
        /// The child's type.
        child_type: AccountType,
    },

    /// Unrecognized account type name.
    #[error("Unknown account type: {0}")]
    UnknownAccountType(String),

    /// Account named as its own parent.
    #[error("An account cannot be its own parent")]
    SelfParent,

    /// New parent is a descendant of the account.
    #[error("Setting parent {parent} on account {account} would create a cycle")]
    HierarchyCycle {
        /// The account being updated.
        account: AccountId,
        /// The requested parent.
        parent: AccountId,
    },

    /// Type change requested on an account with postings.
    #[error("Cannot change account type for account {0} because it has ledger entries")]
    TypeChangeNotAllowed(AccountId),

    /// Mutation of a system account.
    #[error("Cannot modify system account {0}")]
    SystemAccountImmutable(AccountId),

    /// Deletion of a system account.
    #[error("Cannot delete system account {0}")]
    SystemAccountUndeletable(AccountId),
}

impl AccountError {
    /// Returns the taxonomy kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::AccountNotFound(_) | Self::ParentNotFound(_) | Self::CompanyNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::DuplicateCode(_) => ErrorKind::Conflict,
            Self::EmptyField(_)
            | Self::ParentTypeMismatch { .. }
            | Self::ChildTypeMismatch { .. }
            | Self::UnknownAccountType(_)
            | Self::SelfParent
            | Self::HierarchyCycle { .. }
            | Self::TypeChangeNotAllowed(_) => ErrorKind::InvalidArgument,
            Self::SystemAccountImmutable(_) | Self::SystemAccountUndeletable(_) => {
                ErrorKind::Forbidden
            }
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::ParentNotFound(_) => "PARENT_ACCOUNT_NOT_FOUND",
            Self::CompanyNotFound(_) => "COMPANY_NOT_FOUND",
            Self::DuplicateCode(_) => "DUPLICATE_ACCOUNT_CODE",
            Self::EmptyField(_) => "EMPTY_FIELD",
            Self::ParentTypeMismatch { .. } => "PARENT_TYPE_MISMATCH",
            Self::ChildTypeMismatch { .. } => "CHILD_TYPE_MISMATCH",
            Self::UnknownAccountType(_) => "UNKNOWN_ACCOUNT_TYPE",
            Self::SelfParent => "SELF_PARENT",
            Self::HierarchyCycle { .. } => "HIERARCHY_CYCLE",
            Self::TypeChangeNotAllowed(_) => "ACCOUNT_TYPE_CHANGE_NOT_ALLOWED",
            Self::SystemAccountImmutable(_) => "SYSTEM_ACCOUNT_IMMUTABLE",
            Self::SystemAccountUndeletable(_) => "SYSTEM_ACCOUNT_UNDELETABLE",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        self.kind().http_status_code()
    }
}

impl From<AccountError> for AppError {
    fn from(err: AccountError) -> Self {
        let message = err.to_string();
        match err.kind() {
            ErrorKind::NotFound => Self::NotFound(message),
            ErrorKind::Forbidden => Self::Forbidden(message),
            ErrorKind::InvalidArgument => Self::InvalidArgument(message),
            ErrorKind::Conflict => Self::Conflict(message),
            ErrorKind::Inconsistent => Self::Inconsistent(message),
            ErrorKind::Storage => Self::Database(message),
        }
    }
}

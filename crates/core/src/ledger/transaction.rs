//! Transaction headers and their status lifecycle.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{AccountId, CompanyId, TransactionId};

/// Transaction status.
///
/// Only posted transactions contribute to balances and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Being prepared, excluded from reports.
    Draft,
    /// Final, included in balances and reports.
    Posted,
    /// Cancelled, excluded from reports.
    Voided,
}

impl TransactionStatus {
    /// Returns the lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Posted => "posted",
            Self::Voided => "voided",
        }
    }

    /// Returns true if lines with this status count towards balances.
    #[must_use]
    pub const fn is_posted(self) -> bool {
        matches!(self, Self::Posted)
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "posted" => Ok(Self::Posted),
            "voided" => Ok(Self::Voided),
            _ => Err(format!("Unknown transaction status: {s}")),
        }
    }
}

/// Transaction header. Lines are stored separately and reference it by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier.
    pub id: TransactionId,
    /// Owning company.
    pub company_id: CompanyId,
    /// Accounting date.
    pub date: NaiveDate,
    /// Free-text description.
    pub description: String,
    /// External reference (invoice number, cheque number).
    pub reference: Option<String>,
    /// Current status.
    pub status: TransactionStatus,
}

impl Transaction {
    /// Returns true if the transaction can be posted.
    #[must_use]
    pub fn can_post(&self) -> bool {
        self.status == TransactionStatus::Draft
    }

    /// Returns true if the transaction can be voided.
    #[must_use]
    pub fn can_void(&self) -> bool {
        matches!(self.status, TransactionStatus::Draft | TransactionStatus::Posted)
    }
}

/// One line of a transaction being recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineInput {
    /// Account posted to.
    pub account_id: AccountId,
    /// Signed amount: positive debits, negative credits.
    pub amount: Decimal,
    /// Optional line memo.
    pub description: Option<String>,
}

/// Input for recording a transaction with its lines.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    /// Owning company.
    pub company_id: CompanyId,
    /// Accounting date.
    pub date: NaiveDate,
    /// Free-text description.
    pub description: String,
    /// External reference.
    pub reference: Option<String>,
    /// Initial status; `Posted` applies the lines to account balances.
    pub status: TransactionStatus,
    /// Lines in entry order.
    pub lines: Vec<LineInput>,
}

impl NewTransaction {
    /// Creates a draft with no lines.
    #[must_use]
    pub fn new(company_id: CompanyId, date: NaiveDate, description: impl Into<String>) -> Self {
        Self {
            company_id,
            date,
            description: description.into(),
            reference: None,
            status: TransactionStatus::Draft,
            lines: Vec::new(),
        }
    }

    /// Sets the external reference.
    #[must_use]
    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Appends a line.
    #[must_use]
    pub fn line(mut self, account_id: AccountId, amount: Decimal) -> Self {
        self.lines.push(LineInput {
            account_id,
            amount,
            description: None,
        });
        self
    }

    /// Records the transaction directly as posted.
    #[must_use]
    pub fn posted(mut self) -> Self {
        self.status = TransactionStatus::Posted;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            TransactionStatus::Draft,
            TransactionStatus::Posted,
            TransactionStatus::Voided,
        ] {
            assert_eq!(status.as_str().parse::<TransactionStatus>().unwrap(), status);
        }
        assert!("pending".parse::<TransactionStatus>().is_err());
    }

    #[test]
    fn test_transitions() {
        let mut txn = Transaction {
            id: TransactionId::new(),
            company_id: CompanyId::new(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            description: "Sale".to_string(),
            reference: None,
            status: TransactionStatus::Draft,
        };
        assert!(txn.can_post());
        assert!(txn.can_void());

        txn.status = TransactionStatus::Posted;
        assert!(!txn.can_post());
        assert!(txn.can_void());

        txn.status = TransactionStatus::Voided;
        assert!(!txn.can_post());
        assert!(!txn.can_void());
    }
}

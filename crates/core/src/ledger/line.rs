//! Ledger lines: signed postings against one account.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{AccountId, LedgerLineId, TransactionId};

/// A single signed posting.
///
/// Debits are positive and credits negative, so the lines of a balanced
/// transaction sum to zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerLine {
    /// Unique identifier.
    pub id: LedgerLineId,
    /// Parent transaction.
    pub transaction_id: TransactionId,
    /// Account posted to.
    pub account_id: AccountId,
    /// Signed amount.
    pub amount: Decimal,
    /// Transaction date, copied from the header for period filtering.
    pub date: NaiveDate,
    /// Optional line memo.
    pub description: Option<String>,
}

impl LedgerLine {
    /// Returns the debit part of the line (zero for credits).
    #[must_use]
    pub fn debit(&self) -> Decimal {
        self.amount.max(Decimal::ZERO)
    }

    /// Returns the credit part of the line as a positive number.
    #[must_use]
    pub fn credit(&self) -> Decimal {
        (-self.amount).max(Decimal::ZERO)
    }
}

/// Returns the sum of the amounts; zero for a balanced transaction.
pub fn transaction_imbalance<'a>(lines: impl IntoIterator<Item = &'a LedgerLine>) -> Decimal {
    lines.into_iter().map(|line| line.amount).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(amount: Decimal) -> LedgerLine {
        LedgerLine {
            id: LedgerLineId::new(),
            transaction_id: TransactionId::new(),
            account_id: AccountId::new(),
            amount,
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            description: None,
        }
    }

    #[test]
    fn test_debit_credit_split() {
        let debit = line(dec!(100.00));
        assert_eq!(debit.debit(), dec!(100.00));
        assert_eq!(debit.credit(), Decimal::ZERO);

        let credit = line(dec!(-40.25));
        assert_eq!(credit.debit(), Decimal::ZERO);
        assert_eq!(credit.credit(), dec!(40.25));
    }

    #[test]
    fn test_transaction_imbalance() {
        let balanced = [line(dec!(100)), line(dec!(-60)), line(dec!(-40))];
        assert_eq!(transaction_imbalance(&balanced), Decimal::ZERO);

        let unbalanced = [line(dec!(100)), line(dec!(-99.99))];
        assert_eq!(transaction_imbalance(&unbalanced), dec!(0.01));

        let empty: [LedgerLine; 0] = [];
        assert_eq!(transaction_imbalance(&empty), Decimal::ZERO);
    }
}

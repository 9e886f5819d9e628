//! Property tests for the double-entry invariant.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use tally_shared::types::{AccountId, CompanyId, CurrencyCode};

use super::company::Company;
use super::line::transaction_imbalance;
use super::period::Period;
use super::snapshot::LedgerSnapshot;
use super::store::LedgerSource;
use super::transaction::NewTransaction;
use crate::account::{AccountType, NewAccount};

/// Amounts from 0.01 to 100,000.00.
fn amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Debit legs of one transaction as (account index, amount).
fn debit_legs() -> impl Strategy<Value = Vec<(usize, Decimal)>> {
    prop::collection::vec((0usize..6, amount()), 1..5)
}

fn ledger() -> (LedgerSnapshot, CompanyId, Vec<AccountId>) {
    let mut ledger = LedgerSnapshot::new();
    let company = Company::new("Props", CurrencyCode::USD);
    let company_id = company.id;
    ledger.insert_company(company);

    let chart = [
        ("1000", AccountType::Asset),
        ("2000", AccountType::Liability),
        ("3000", AccountType::Equity),
        ("4000", AccountType::Revenue),
        ("5000", AccountType::Expense),
        ("6000", AccountType::Expense),
    ];
    let ids = chart
        .iter()
        .map(|(code, account_type)| {
            ledger
                .create_account(NewAccount::new(company_id, *code, *code, *account_type))
                .unwrap()
                .id
        })
        .collect();
    (ledger, company_id, ids)
}

/// Builds a balanced transaction: each debit leg is offset by one credit on
/// the credit account.
fn balanced(
    company: CompanyId,
    ids: &[AccountId],
    legs: &[(usize, Decimal)],
    credit_idx: usize,
) -> NewTransaction {
    let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let mut input = NewTransaction::new(company, date, "generated").posted();
    let mut total = Decimal::ZERO;
    for (idx, amount) in legs {
        input = input.line(ids[*idx], *amount);
        total += *amount;
    }
    input.line(ids[credit_idx], -total)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every posted transaction sums to zero, and so do all stored balances.
    #[test]
    fn prop_posted_transactions_balance(
        txns in prop::collection::vec((debit_legs(), 0usize..6), 1..20),
    ) {
        let (mut ledger, company, ids) = ledger();
        let mut recorded = Vec::new();
        for (legs, credit_idx) in &txns {
            let input = balanced(company, &ids, legs, *credit_idx);
            recorded.push(ledger.record_transaction(input).unwrap());
        }

        for txn in &recorded {
            let lines = ledger.fetch_transaction_lines(company, &[*txn]).unwrap();
            prop_assert_eq!(transaction_imbalance(&lines), Decimal::ZERO);
        }

        let all_lines = ledger.fetch_posted_lines(company, &ids, &Period::all()).unwrap();
        prop_assert_eq!(transaction_imbalance(&all_lines), Decimal::ZERO);

        let stored: Decimal = ledger
            .fetch_accounts(company, &crate::account::AccountFilter::all())
            .unwrap()
            .iter()
            .map(|a| a.current_balance)
            .sum();
        prop_assert_eq!(stored, Decimal::ZERO);
    }

    /// Voiding every posted transaction returns every stored balance to zero.
    #[test]
    fn prop_void_restores_zero_balances(
        txns in prop::collection::vec((debit_legs(), 0usize..6), 1..10),
    ) {
        let (mut ledger, company, ids) = ledger();
        let mut recorded = Vec::new();
        for (legs, credit_idx) in &txns {
            let input = balanced(company, &ids, legs, *credit_idx);
            recorded.push(ledger.record_transaction(input).unwrap());
        }
        for txn in recorded {
            ledger.void_transaction(company, txn).unwrap();
        }

        for id in &ids {
            prop_assert_eq!(
                ledger.account(company, *id).unwrap().current_balance,
                Decimal::ZERO
            );
        }
    }
}

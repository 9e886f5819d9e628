//! Balance queries over a ledger source.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::Serialize;
use tally_shared::ReportSettings;
use tally_shared::types::{AccountId, CompanyId};
use tracing::{instrument, warn};

use super::accumulator::{
    AccountActivity, BalanceAccumulator, Balances, accumulate, accumulate_parallel,
};
use super::cache::{BalanceCache, BalanceKey};
use crate::account::{Account, AccountFilter, AccountType};
use crate::ledger::{LedgerLine, LedgerSource, LedgerStoreError, Period};

/// Line count above which accumulation runs on the rayon pool.
const PARALLEL_THRESHOLD: usize = 50_000;

/// Lines per parallel task.
const PARALLEL_CHUNK: usize = 8_192;

/// Sums posted lines for an account set within a period.
///
/// Every requested account appears in the result, with zero activity if it
/// had no lines.
///
/// # Errors
///
/// Propagates store errors.
pub fn balance<S: LedgerSource + ?Sized>(
    source: &S,
    company_id: CompanyId,
    account_ids: &[AccountId],
    period: &Period,
) -> Result<Balances, LedgerStoreError> {
    let lines = source.fetch_posted_lines(company_id, account_ids, period)?;
    let mut acc = sum_lines(&lines);
    acc.include(account_ids);
    Ok(acc.finish())
}

/// Picks sequential or parallel accumulation by input size.
pub(crate) fn sum_lines(lines: &[LedgerLine]) -> BalanceAccumulator {
    if lines.len() >= PARALLEL_THRESHOLD {
        accumulate_parallel(lines, PARALLEL_CHUNK)
    } else {
        accumulate(lines)
    }
}

/// Balance detail for one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountBalance {
    /// The account.
    pub account: Account,
    /// Denormalized balance stored on the account.
    pub stored_balance: Decimal,
    /// Signed sum of every posted line. The source of truth.
    pub computed_balance: Decimal,
    /// Signed sum within the requested period, if one was given.
    pub period_balance: Option<Decimal>,
    /// Debits within the period (all time when no period).
    pub debits: Decimal,
    /// Credits within the period (all time when no period).
    pub credits: Decimal,
    /// Distinct transactions within the period.
    pub transaction_count: u64,
    /// `stored_balance - computed_balance`.
    pub drift: Decimal,
}

/// Active account count and total per type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeSummary {
    /// Account type.
    pub account_type: AccountType,
    /// Number of active accounts.
    pub account_count: u64,
    /// Sum of computed balances in display sign.
    pub total_balance: Decimal,
}

/// Balance queries with a cache of computed all-time balances.
#[derive(Clone, Default)]
pub struct BalanceService {
    cache: BalanceCache,
}

impl BalanceService {
    /// Creates a service sized from report settings.
    #[must_use]
    pub fn new(settings: &ReportSettings) -> Self {
        Self {
            cache: BalanceCache::with_config(
                settings.balance_cache_capacity,
                settings.balance_cache_ttl_secs,
            ),
        }
    }

    /// Returns the underlying cache.
    #[must_use]
    pub fn cache(&self) -> &BalanceCache {
        &self.cache
    }

    /// All-time activity for one account, cached per ledger revision.
    ///
    /// # Errors
    ///
    /// Propagates store errors.
    pub fn computed_activity<S: LedgerSource + ?Sized>(
        &self,
        source: &S,
        company_id: CompanyId,
        account_id: AccountId,
    ) -> Result<AccountActivity, LedgerStoreError> {
        let key = BalanceKey {
            company_id,
            account_id,
            revision: source.revision(company_id)?,
        };
        let (activity, _) = self.cache.get_or_try_compute(key, || {
            balance(source, company_id, &[account_id], &Period::all())
                .map(|balances| balances.activity(account_id))
        })?;
        Ok(activity)
    }

    /// Balance detail for one account.
    ///
    /// The computed balance always wins; a stored balance that disagrees is
    /// reported as `drift` and logged.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the account is not in the company's chart,
    /// or propagates store errors.
    #[instrument(skip_all, fields(company_id = %company_id, account_id = %account_id))]
    pub fn account_balance<S: LedgerSource + ?Sized>(
        &self,
        source: &S,
        company_id: CompanyId,
        account_id: AccountId,
        period: Option<Period>,
    ) -> Result<AccountBalance, LedgerStoreError> {
        let account = source
            .fetch_accounts(company_id, &AccountFilter::all())?
            .into_iter()
            .find(|a| a.id == account_id)
            .ok_or(LedgerStoreError::AccountNotFound {
                company: company_id,
                account: account_id,
            })?;

        let all_time = self.computed_activity(source, company_id, account_id)?;

        let window = period.unwrap_or_default();
        let lines = source.fetch_posted_lines(company_id, &[account_id], &window)?;
        let in_window = accumulate(&lines).finish().activity(account_id);
        let transaction_count = lines
            .iter()
            .map(|l| l.transaction_id)
            .collect::<HashSet<_>>()
            .len() as u64;

        let drift = account.current_balance - all_time.net;
        if !drift.is_zero() {
            warn!(
                stored = %account.current_balance,
                computed = %all_time.net,
                "Stored account balance differs from ledger"
            );
        }

        Ok(AccountBalance {
            stored_balance: account.current_balance,
            computed_balance: all_time.net,
            period_balance: period.map(|_| in_window.net),
            debits: in_window.debits,
            credits: in_window.credits,
            transaction_count,
            drift,
            account,
        })
    }

    /// Active account count and display-sign total for each type.
    ///
    /// # Errors
    ///
    /// Propagates store errors.
    #[instrument(skip_all, fields(company_id = %company_id))]
    pub fn type_summary<S: LedgerSource + ?Sized>(
        &self,
        source: &S,
        company_id: CompanyId,
    ) -> Result<Vec<TypeSummary>, LedgerStoreError> {
        let accounts = source.fetch_accounts(
            company_id,
            &AccountFilter {
                is_active: Some(true),
                ..AccountFilter::default()
            },
        )?;
        let ids: Vec<AccountId> = accounts.iter().map(|a| a.id).collect();
        let balances = balance(source, company_id, &ids, &Period::all())?;

        Ok(AccountType::ALL
            .iter()
            .map(|&account_type| {
                let of_type = accounts.iter().filter(|a| a.account_type == account_type);
                let (count, net) = of_type.fold((0u64, Decimal::ZERO), |(count, net), a| {
                    (count + 1, net + balances.net(a.id))
                });
                TypeSummary {
                    account_type,
                    account_count: count,
                    total_balance: account_type.display_amount(net),
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::NewAccount;
    use crate::ledger::{Company, LedgerSnapshot, NewTransaction};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use tally_shared::types::CurrencyCode;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    struct Fixture {
        ledger: LedgerSnapshot,
        company: CompanyId,
        cash: AccountId,
        sales: AccountId,
        rent: AccountId,
    }

    fn fixture() -> Fixture {
        let mut ledger = LedgerSnapshot::new();
        let company = Company::new("Acme", CurrencyCode::USD);
        let company_id = company.id;
        ledger.insert_company(company);
        let mut add = |code: &str, name: &str, t: AccountType| {
            ledger
                .create_account(NewAccount::new(company_id, code, name, t))
                .unwrap()
                .id
        };
        let cash = add("1000", "Cash", AccountType::Asset);
        let sales = add("4000", "Sales", AccountType::Revenue);
        let rent = add("6200", "Rent", AccountType::Expense);

        for (day, amount) in [(1, dec!(100)), (15, dec!(250))] {
            let input = NewTransaction::new(company_id, date(2024, 3, day), "Sale")
                .line(cash, amount)
                .line(sales, -amount)
                .posted();
            ledger.record_transaction(input).unwrap();
        }
        let input = NewTransaction::new(company_id, date(2024, 4, 1), "April rent")
            .line(rent, dec!(80))
            .line(cash, dec!(-80))
            .posted();
        ledger.record_transaction(input).unwrap();

        Fixture {
            ledger,
            company: company_id,
            cash,
            sales,
            rent,
        }
    }

    fn sale(company: CompanyId, cash: AccountId, sales: AccountId, amount: Decimal) -> NewTransaction {
        NewTransaction::new(company, date(2024, 3, 1), "Sale")
            .line(cash, amount)
            .line(sales, -amount)
            .posted()
    }

    #[test]
    fn test_reloaded_ledger_does_not_reuse_cached_balance() {
        let service = BalanceService::default();
        let company = Company::new("Acme", CurrencyCode::USD);
        let company_id = company.id;

        let mut first = LedgerSnapshot::new();
        first.insert_company(company.clone());
        let cash = first
            .create_account(NewAccount::new(company_id, "1000", "Cash", AccountType::Asset))
            .unwrap();
        let sales = first
            .create_account(NewAccount::new(company_id, "4000", "Sales", AccountType::Revenue))
            .unwrap();
        first
            .record_transaction(sale(company_id, cash.id, sales.id, dec!(100)))
            .unwrap();

        // Same company loaded again after the ledger changed, with the same
        // number of writes.
        let mut reloaded = LedgerSnapshot::new();
        reloaded.insert_company(company);
        reloaded.insert_account(cash.clone()).unwrap();
        reloaded.insert_account(sales.clone()).unwrap();
        reloaded
            .record_transaction(sale(company_id, cash.id, sales.id, dec!(250)))
            .unwrap();

        let before = service
            .account_balance(&first, company_id, cash.id, None)
            .unwrap();
        assert_eq!(before.computed_balance, dec!(100));

        let after = service
            .account_balance(&reloaded, company_id, cash.id, None)
            .unwrap();
        assert_eq!(after.stored_balance, dec!(250));
        assert_eq!(after.computed_balance, dec!(250));
        assert_eq!(after.drift, Decimal::ZERO);
    }

    #[test]
    fn test_balance_includes_idle_accounts() {
        let f = fixture();
        let march = Period::between(date(2024, 3, 1), date(2024, 3, 31)).unwrap();
        let balances = balance(&f.ledger, f.company, &[f.cash, f.rent], &march).unwrap();

        assert_eq!(balances.net(f.cash), dec!(350));
        assert_eq!(balances.activity(f.rent).line_count, 0);
        assert!(balances.per_account.contains_key(&f.rent));
        assert_eq!(balances.total, dec!(350));
    }

    #[test]
    fn test_account_balance_detail() {
        let f = fixture();
        let service = BalanceService::default();
        let april = Period::between(date(2024, 4, 1), date(2024, 4, 30)).unwrap();
        let detail = service
            .account_balance(&f.ledger, f.company, f.cash, Some(april))
            .unwrap();

        assert_eq!(detail.computed_balance, dec!(270));
        assert_eq!(detail.stored_balance, dec!(270));
        assert_eq!(detail.drift, Decimal::ZERO);
        assert_eq!(detail.period_balance, Some(dec!(-80)));
        assert_eq!(detail.credits, dec!(80));
        assert_eq!(detail.debits, Decimal::ZERO);
        assert_eq!(detail.transaction_count, 1);
    }

    #[test]
    fn test_account_balance_without_period() {
        let f = fixture();
        let detail = BalanceService::default()
            .account_balance(&f.ledger, f.company, f.sales, None)
            .unwrap();
        assert_eq!(detail.period_balance, None);
        assert_eq!(detail.credits, dec!(350));
        assert_eq!(detail.transaction_count, 2);
    }

    #[test]
    fn test_account_balance_reports_drift() {
        let mut f = fixture();
        let mut stale = f.ledger.account(f.company, f.cash).unwrap().clone();
        stale.current_balance = dec!(999);
        stale.id = AccountId::new();
        stale.code = "1001".to_string();
        let stale_id = stale.id;
        f.ledger.insert_account(stale).unwrap();

        let detail = BalanceService::default()
            .account_balance(&f.ledger, f.company, stale_id, None)
            .unwrap();
        assert_eq!(detail.computed_balance, Decimal::ZERO);
        assert_eq!(detail.drift, dec!(999));
    }

    #[test]
    fn test_account_balance_unknown_account() {
        let f = fixture();
        let err = BalanceService::default()
            .account_balance(&f.ledger, f.company, AccountId::new(), None)
            .unwrap_err();
        assert!(matches!(err, LedgerStoreError::AccountNotFound { .. }));
    }

    #[test]
    fn test_cached_balance_refreshes_after_write() {
        let mut f = fixture();
        let service = BalanceService::default();
        let before = service
            .computed_activity(&f.ledger, f.company, f.cash)
            .unwrap();
        assert_eq!(before.net, dec!(270));

        let input = NewTransaction::new(f.company, date(2024, 5, 1), "Sale")
            .line(f.cash, dec!(30))
            .line(f.sales, dec!(-30))
            .posted();
        f.ledger.record_transaction(input).unwrap();

        let after = service
            .computed_activity(&f.ledger, f.company, f.cash)
            .unwrap();
        assert_eq!(after.net, dec!(300));
    }

    #[test]
    fn test_type_summary() {
        let f = fixture();
        let summary = BalanceService::default()
            .type_summary(&f.ledger, f.company)
            .unwrap();

        assert_eq!(summary.len(), 5);
        let of = |t: AccountType| summary.iter().find(|s| s.account_type == t).unwrap();
        assert_eq!(of(AccountType::Asset).total_balance, dec!(270));
        assert_eq!(of(AccountType::Revenue).total_balance, dec!(350));
        assert_eq!(of(AccountType::Expense).total_balance, dec!(80));
        assert_eq!(of(AccountType::Liability).account_count, 0);
        assert_eq!(of(AccountType::Liability).total_balance, Decimal::ZERO);
    }
}

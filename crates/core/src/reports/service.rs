//! Statement engine.
//!
//! Composes hierarchy selection and balance accumulation into the profit and
//! loss, balance sheet, cash flow, and trend reports. Every report is a pure
//! function of the ledger source it is given.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tally_shared::ReportSettings;
use tally_shared::types::{AccountId, CompanyId, TransactionId};
use tracing::{debug, instrument, warn};

use super::cash_flow::{classify, counter_lines};
use super::error::ReportError;
use super::trend::{Interval, bucket};
use super::types::{
    BalanceSheet, CashFlowCategory, CashFlowItem, CashFlowStatement, ProfitAndLoss,
    StatementLine, StatementSection, Trend, TrendKind,
};
use crate::account::{Account, AccountFilter, AccountType};
use crate::balance::{self, AccountBalance, BalanceService, Balances, TypeSummary};
use crate::hierarchy::{ChartTree, build_tree};
use crate::ledger::{LedgerSource, Period};

/// Generates financial statements from a ledger source.
///
/// Holds configuration and the computed-balance cache; the source is passed
/// per call so one engine can serve any number of snapshots.
#[derive(Clone)]
pub struct StatementEngine {
    settings: ReportSettings,
    balances: BalanceService,
}

impl StatementEngine {
    /// Creates an engine.
    #[must_use]
    pub fn new(settings: ReportSettings) -> Self {
        let balances = BalanceService::new(&settings);
        Self { settings, balances }
    }

    /// Report settings in use.
    #[must_use]
    pub fn settings(&self) -> &ReportSettings {
        &self.settings
    }

    /// Profit and loss over `start..=end`.
    ///
    /// Revenue shows the negated line sum, expenses the line sum, and
    /// `net_income = revenue - expenses`.
    ///
    /// # Errors
    ///
    /// `InvalidDateRange`, `CompanyNotFound`, `Inconsistent`, or store errors.
    #[instrument(skip_all, fields(company_id = %company_id, %start, %end))]
    pub fn profit_and_loss<S: LedgerSource + ?Sized>(
        &self,
        source: &S,
        company_id: CompanyId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ProfitAndLoss, ReportError> {
        let period = Period::between(start, end)?;
        let company = source.company(company_id)?;
        let chart = Chart::load(source, company_id)?;

        let revenue = chart.active_of(AccountType::Revenue);
        let expenses = chart.active_of(AccountType::Expense);
        let balances = chart.balances(
            source,
            company_id,
            &[revenue.as_slice(), expenses.as_slice()],
            &period,
        )?;

        let revenue = section(&revenue, &balances);
        let expenses = section(&expenses, &balances);
        let net_income = revenue.total - expenses.total;

        debug!(%net_income, "Profit and loss generated");
        Ok(ProfitAndLoss {
            company_id,
            currency: company.currency,
            start_date: start,
            end_date: end,
            revenue,
            expenses,
            net_income,
        })
    }

    /// Balance sheet including every posted line up to `as_of`.
    ///
    /// An imbalance beyond the configured tolerance is reported through
    /// `balanced = false`, never as an error.
    ///
    /// # Errors
    ///
    /// `CompanyNotFound`, `Inconsistent`, or store errors.
    #[instrument(skip_all, fields(company_id = %company_id, %as_of))]
    pub fn balance_sheet<S: LedgerSource + ?Sized>(
        &self,
        source: &S,
        company_id: CompanyId,
        as_of: NaiveDate,
    ) -> Result<BalanceSheet, ReportError> {
        let period = Period::as_of(as_of);
        let company = source.company(company_id)?;
        let chart = Chart::load(source, company_id)?;

        let assets = chart.active_of(AccountType::Asset);
        let liabilities = chart.active_of(AccountType::Liability);
        let equity = chart.active_of(AccountType::Equity);
        let balances = chart.balances(
            source,
            company_id,
            &[assets.as_slice(), liabilities.as_slice(), equity.as_slice()],
            &period,
        )?;

        let assets = section(&assets, &balances);
        let liabilities = section(&liabilities, &balances);
        let equity = section(&equity, &balances);

        let total_liabilities_and_equity = liabilities.total + equity.total;
        let difference = assets.total - total_liabilities_and_equity;
        let balanced = difference.abs() < self.settings.balance_tolerance;
        if !balanced {
            warn!(%difference, "Balance sheet does not balance");
        }

        Ok(BalanceSheet {
            company_id,
            currency: company.currency,
            as_of,
            assets,
            liabilities,
            equity,
            total_liabilities_and_equity,
            difference,
            balanced,
        })
    }

    /// Cash flow over `start..=end`.
    ///
    /// Cash accounts are bank accounts and accounts with the `cash` subtype,
    /// active or not. Each cash line is classified by the non-cash lines of
    /// its transaction.
    ///
    /// # Errors
    ///
    /// `InvalidDateRange`, `CompanyNotFound`, `Inconsistent`, or store errors.
    #[instrument(skip_all, fields(company_id = %company_id, %start, %end))]
    pub fn cash_flow<S: LedgerSource + ?Sized>(
        &self,
        source: &S,
        company_id: CompanyId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<CashFlowStatement, ReportError> {
        let period = Period::between(start, end)?;
        let company = source.company(company_id)?;
        let chart = Chart::load(source, company_id)?;

        let cash_ids: Vec<AccountId> = chart.cash().iter().map(|a| a.id).collect();
        let cash_set: HashSet<AccountId> = cash_ids.iter().copied().collect();

        Chart::ensure_resolved(source, company_id, &period)?;
        let movements = source.fetch_posted_lines(company_id, &cash_ids, &period)?;

        let mut transaction_ids: Vec<TransactionId> = Vec::new();
        let mut seen = HashSet::new();
        for line in &movements {
            if seen.insert(line.transaction_id) {
                transaction_ids.push(line.transaction_id);
            }
        }

        let transaction_lines = source.fetch_transaction_lines(company_id, &transaction_ids)?;
        let counters = counter_lines(&transaction_lines, &cash_set);
        let headers: HashMap<TransactionId, _> = source
            .fetch_transactions(company_id, &transaction_ids)?
            .into_iter()
            .map(|t| (t.id, t))
            .collect();

        let mut statement = CashFlowStatement {
            company_id,
            currency: company.currency,
            start_date: start,
            end_date: end,
            operating: Default::default(),
            investing: Default::default(),
            financing: Default::default(),
            net_cash_flow: Decimal::ZERO,
            beginning_balance: Decimal::ZERO,
            ending_balance: Decimal::ZERO,
        };

        for line in &movements {
            let category = classify(
                counters
                    .get(&line.transaction_id)
                    .map_or(&[][..], Vec::as_slice),
                &chart.by_id,
            )?;
            let header = headers.get(&line.transaction_id);
            let item = CashFlowItem {
                transaction_id: line.transaction_id,
                line_id: line.id,
                date: line.date,
                description: header.map(|t| t.description.clone()).unwrap_or_default(),
                reference: header.and_then(|t| t.reference.clone()),
                amount: line.amount,
            };
            match category {
                CashFlowCategory::Operating => statement.operating.push(item),
                CashFlowCategory::Investing => statement.investing.push(item),
                CashFlowCategory::Financing => statement.financing.push(item),
            }
        }
        for group in [
            &mut statement.operating,
            &mut statement.investing,
            &mut statement.financing,
        ] {
            group.sort();
        }

        statement.net_cash_flow =
            statement.operating.total + statement.investing.total + statement.financing.total;
        statement.beginning_balance =
            balance::balance(source, company_id, &cash_ids, &Period::before(start))?.total;
        statement.ending_balance = statement.beginning_balance + statement.net_cash_flow;

        debug!(net_cash_flow = %statement.net_cash_flow, "Cash flow generated");
        Ok(statement)
    }

    /// Amounts over `start..=end` bucketed by calendar interval.
    ///
    /// Revenue and expense trends use active accounts in display sign; the
    /// cash flow trend is the net movement on cash accounts.
    ///
    /// # Errors
    ///
    /// `InvalidDateRange`, `CompanyNotFound`, `Inconsistent`, or store errors.
    #[instrument(skip_all, fields(company_id = %company_id, %kind, %interval))]
    pub fn trend<S: LedgerSource + ?Sized>(
        &self,
        source: &S,
        company_id: CompanyId,
        kind: TrendKind,
        start: NaiveDate,
        end: NaiveDate,
        interval: Interval,
    ) -> Result<Trend, ReportError> {
        let period = Period::between(start, end)?;
        let company = source.company(company_id)?;
        let chart = Chart::load(source, company_id)?;

        let (accounts, sign) = match kind {
            TrendKind::Revenue => (
                chart.active_of(AccountType::Revenue),
                AccountType::Revenue.display_sign(),
            ),
            TrendKind::Expense => (
                chart.active_of(AccountType::Expense),
                AccountType::Expense.display_sign(),
            ),
            TrendKind::CashFlow => (chart.cash(), Decimal::ONE),
        };
        let ids: Vec<AccountId> = accounts.iter().map(|a| a.id).collect();
        Chart::ensure_resolved(source, company_id, &period)?;
        let lines = source.fetch_posted_lines(company_id, &ids, &period)?;

        let points = bucket(
            lines.iter().map(|l| (l.date, l.amount * sign)),
            interval,
            self.settings.week_start,
        );

        Ok(Trend {
            company_id,
            currency: company.currency,
            kind,
            interval,
            start_date: start,
            end_date: end,
            points,
        })
    }

    /// Balance detail for one account (see [`BalanceService::account_balance`]).
    ///
    /// # Errors
    ///
    /// `AccountNotFound`, `CompanyNotFound`, or store errors.
    pub fn account_balance<S: LedgerSource + ?Sized>(
        &self,
        source: &S,
        company_id: CompanyId,
        account_id: AccountId,
        period: Option<Period>,
    ) -> Result<AccountBalance, ReportError> {
        Ok(self
            .balances
            .account_balance(source, company_id, account_id, period)?)
    }

    /// Active account count and total per type.
    ///
    /// # Errors
    ///
    /// `CompanyNotFound` or store errors.
    pub fn type_summary<S: LedgerSource + ?Sized>(
        &self,
        source: &S,
        company_id: CompanyId,
    ) -> Result<Vec<TypeSummary>, ReportError> {
        Ok(self.balances.type_summary(source, company_id)?)
    }

    /// The company's active chart of accounts as a tree.
    ///
    /// # Errors
    ///
    /// `CompanyNotFound` or store errors.
    pub fn hierarchy<S: LedgerSource + ?Sized>(
        &self,
        source: &S,
        company_id: CompanyId,
    ) -> Result<ChartTree, ReportError> {
        let accounts = source.fetch_accounts(company_id, &AccountFilter::all())?;
        Ok(build_tree(&accounts))
    }
}

impl Default for StatementEngine {
    fn default() -> Self {
        Self::new(ReportSettings::default())
    }
}

/// A company's full chart (inactive accounts included), indexed for one report.
struct Chart {
    by_id: HashMap<AccountId, Account>,
    tree: ChartTree,
}

impl Chart {
    fn load<S: LedgerSource + ?Sized>(source: &S, company_id: CompanyId) -> Result<Self, ReportError> {
        let accounts = source.fetch_accounts(company_id, &AccountFilter::all())?;
        let tree = build_tree(&accounts);
        let by_id = accounts.into_iter().map(|a| (a.id, a)).collect();
        Ok(Self { by_id, tree })
    }

    /// Active accounts of a type, ordered by code.
    fn active_of(&self, account_type: AccountType) -> Vec<&Account> {
        let mut accounts: Vec<&Account> = self
            .tree
            .preorder(account_type)
            .into_iter()
            .map(|node| &node.account)
            .collect();
        accounts.sort_by(|a, b| a.code.cmp(&b.code));
        accounts
    }

    /// Cash accounts, active or not, ordered by code.
    fn cash(&self) -> Vec<&Account> {
        let mut accounts: Vec<&Account> = self.by_id.values().filter(|a| a.is_cash()).collect();
        accounts.sort_by(|a, b| a.code.cmp(&b.code).then(a.id.cmp(&b.id)));
        accounts
    }

    /// Fails on the first posted line in `period` whose account is missing
    /// from the chart. Such lines never match an account-id filter.
    fn ensure_resolved<S: LedgerSource + ?Sized>(
        source: &S,
        company_id: CompanyId,
        period: &Period,
    ) -> Result<(), ReportError> {
        match source.fetch_unresolved_lines(company_id, period)?.first() {
            Some(line) => Err(ReportError::Inconsistent {
                line: line.id,
                account: line.account_id,
            }),
            None => Ok(()),
        }
    }

    fn balances<S: LedgerSource + ?Sized>(
        &self,
        source: &S,
        company_id: CompanyId,
        groups: &[&[&Account]],
        period: &Period,
    ) -> Result<Balances, ReportError> {
        let ids: Vec<AccountId> = groups.iter().flat_map(|g| g.iter().map(|a| a.id)).collect();
        Self::ensure_resolved(source, company_id, period)?;
        let lines = source.fetch_posted_lines(company_id, &ids, period)?;
        let mut acc = balance::service::sum_lines(&lines);
        acc.include(&ids);
        Ok(acc.finish())
    }
}

/// Display-sign section over `accounts`, omitting zero lines.
fn section(accounts: &[&Account], balances: &Balances) -> StatementSection {
    let mut section = StatementSection::default();
    for account in accounts {
        let amount = account.account_type.display_amount(balances.net(account.id));
        section.total += amount;
        if !amount.is_zero() {
            section.accounts.push(StatementLine::new(account, amount));
        }
    }
    section
}
